// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Show what the store holds and whether a browser is available.

use crate::cli::output;
use crate::renderer::chromium::find_chromium;
use crate::store::{RecordStore, SqliteStore};
use anyhow::{Context, Result};
use std::path::Path;

/// Run the status command.
pub async fn run(db: &Path) -> Result<()> {
    let store = SqliteStore::open(db)
        .with_context(|| format!("failed to open store {}", db.display()))?;
    let urls = store.count_product_urls()?;
    let products = store.count_products()?;
    let chromium = find_chromium();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "db": db.display().to_string(),
            "product_urls": urls,
            "products": products,
            "chromium": chromium.as_ref().map(|p| p.display().to_string()),
        }));
        return Ok(());
    }

    println!("  store:        {}", db.display());
    println!("  product URLs: {urls}");
    println!("  products:     {products}");
    match chromium {
        Some(path) => println!("  chromium:     {}", path.display()),
        None => println!("  chromium:     not found (set SHOPCRAWL_CHROMIUM_PATH)"),
    }
    if urls > 0 && !output::is_quiet() {
        println!();
        println!("  The next `shopcrawl crawl` skips discovery; pass --force-discovery to re-list.");
    }
    Ok(())
}
