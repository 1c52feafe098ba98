// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! `shopcrawl export`: stored products as JSON lines on stdout.

use crate::model::Product;
use crate::store::{RecordStore, SqliteStore};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Run the export command.
pub async fn run(db: &Path, limit: usize) -> Result<()> {
    let store = SqliteStore::open(db)
        .with_context(|| format!("failed to open store {}", db.display()))?;
    let products = store.products(limit)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_jsonl(&mut out, &products)?;
    out.flush().context("failed to flush stdout")?;
    Ok(())
}

/// One compact JSON document per line.
pub fn write_jsonl<W: Write>(out: &mut W, products: &[Product]) -> Result<()> {
    for product in products {
        serde_json::to_writer(&mut *out, product).context("failed to encode product")?;
        out.write_all(b"\n")?;
    }
    Ok(())
}
