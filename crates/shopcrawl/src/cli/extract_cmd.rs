// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! `shopcrawl extract <html-file> --url URL`: run the extraction pipeline on
//! a saved product page without a browser.

use crate::extract::extract_product;
use crate::model::Product;
use crate::renderer::snapshot::SnapshotRenderer;
use crate::renderer::Renderer;
use crate::site::SiteAdapter;
use anyhow::{Context, Result};
use std::path::Path;

/// Extract a product from an HTML document.
pub async fn extract_file(html_path: &Path, url: &str, site: &SiteAdapter) -> Result<Product> {
    let html = std::fs::read_to_string(html_path)
        .with_context(|| format!("failed to read {}", html_path.display()))?;

    let renderer = SnapshotRenderer::single(url, html);
    let mut ctx = renderer.new_context().await?;
    ctx.navigate(url, 0).await?;
    let product = extract_product(ctx.as_ref(), site, url).await;
    ctx.close().await?;

    product.with_context(|| format!("failed to extract {}", html_path.display()))
}

/// Run the extract command; the record is printed as pretty JSON.
pub async fn run(html_path: &Path, url: &str, site: &SiteAdapter) -> Result<()> {
    let product = extract_file(html_path, url, site).await?;
    crate::cli::output::print_json(&product);
    Ok(())
}
