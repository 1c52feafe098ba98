// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Size chart reconstruction.
//!
//! The chart is rendered as a table whose first body row holds the size keys
//! and whose `i+2`-th body row holds the measurements for the `i`-th column
//! header. The result maps every header to one `{size key → cell}` map per
//! size key. A row wider than the key row means the table is not in that
//! shape and nothing from it can be trusted.

use crate::error::CrawlError;
use crate::model::SizeChart;
use crate::renderer::RenderContext;
use crate::site::SiteAdapter;
use std::collections::BTreeMap;

/// Read the size chart on the current page. An absent chart is empty, not an
/// error; failed lookups, unreadable cells and over-wide rows are
/// [`CrawlError::SizeChartGeometry`].
pub async fn extract(ctx: &dyn RenderContext, site: &SiteAdapter) -> Result<SizeChart, CrawlError> {
    let sel = &site.selectors;

    let headers: Vec<String> = read_cells(ctx, &sel.size_chart_headers)
        .await?
        .into_iter()
        .filter(|h| !h.is_empty())
        .collect();
    if headers.is_empty() {
        return Ok(SizeChart::new());
    }

    let keys = read_cells(ctx, &site.size_chart_row(1)).await?;
    let mut rows = Vec::with_capacity(headers.len());
    for i in 0..headers.len() {
        rows.push(read_cells(ctx, &site.size_chart_row(i + 2)).await?);
    }

    assemble(&headers, &keys, rows)
}

/// Texts of every cell matching `selector`. Unlike the other extraction
/// steps, a failed query is an error here, not an empty match.
async fn read_cells(ctx: &dyn RenderContext, selector: &str) -> Result<Vec<String>, CrawlError> {
    let found = ctx
        .find_all(selector, None)
        .await
        .map_err(|e| CrawlError::SizeChartGeometry(format!("lookup `{selector}` failed: {e:#}")))?;
    let mut cells = Vec::new();
    for el in found {
        let text = ctx
            .text(el)
            .await
            .map_err(|e| CrawlError::SizeChartGeometry(format!("unreadable cell in `{selector}`: {e:#}")))?;
        cells.push(text);
    }
    Ok(cells)
}

/// Build the chart from header texts, the size-key row and one cell row per
/// header. Every header gets exactly `keys.len()` maps; a short row leaves
/// the trailing maps empty.
pub fn assemble(
    headers: &[String],
    keys: &[String],
    rows: Vec<Vec<String>>,
) -> Result<SizeChart, CrawlError> {
    let mut chart = SizeChart::new();

    for (header, cells) in headers.iter().zip(rows) {
        if cells.len() > keys.len() {
            return Err(CrawlError::SizeChartGeometry(format!(
                "column `{header}` has {} cells for {} size keys",
                cells.len(),
                keys.len()
            )));
        }

        let mut column = vec![BTreeMap::new(); keys.len()];
        for (j, cell) in cells.into_iter().enumerate() {
            column[j].insert(keys[j].clone(), cell);
        }
        chart.insert(header.clone(), column);
    }

    Ok(chart)
}
