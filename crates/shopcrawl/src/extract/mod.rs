// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Field extraction pipeline for a rendered product page.
//!
//! The pipeline is a fixed sequence of independent steps. Each step looks up
//! its elements, and on a miss or a failed read leaves its field at the zero
//! value and lets the next step run. The only step allowed to abort the
//! record is the size chart, and only under [`SizeChartPolicy::Strict`].

pub mod coordinated;
pub mod description;
pub mod reviews;
pub mod size_chart;
pub mod variants;

use crate::error::CrawlError;
use crate::model::{Product, SizeChart};
use crate::renderer::{ElementHandle, RenderContext};
use crate::site::{SiteAdapter, SizeChartPolicy};
use tracing::{debug, warn};

/// Run every extraction step against the page currently loaded in `ctx`.
pub async fn extract_product(
    ctx: &dyn RenderContext,
    site: &SiteAdapter,
    url: &str,
) -> Result<Product, CrawlError> {
    let sel = &site.selectors;
    let mut product = Product::new(url);

    product.breadcrumbs = breadcrumbs(ctx, site).await;
    product.category = text_of(ctx, &sel.category_name, None).await.unwrap_or_default();
    product.title = text_of(ctx, &sel.title, None).await.unwrap_or_default();
    product.price = text_of(ctx, &sel.price, None).await.unwrap_or_default();

    product.available_colors = variants::colors(ctx, site).await;
    product.available_sizes = non_empty(texts_of(ctx, &sel.sizes, None).await);
    product.media = variants::media(ctx, site).await;
    product.coordinated_products = coordinated::extract(ctx, site).await;

    let desc = description::extract(ctx, site).await;
    product.description_heading = desc.heading;
    product.description_title = desc.title;
    product.description = desc.body;
    product.specifications = desc.specifications;
    product.special_description = desc.special;

    product.size_chart = match size_chart::extract(ctx, site).await {
        Ok(chart) => chart,
        Err(e) => match site.size_chart_policy {
            SizeChartPolicy::Strict => return Err(e),
            SizeChartPolicy::Lenient => {
                warn!("{url}: keeping empty size chart: {e}");
                SizeChart::new()
            }
        },
    };
    product.size_remarks = non_empty(texts_of(ctx, &sel.size_remarks, None).await);

    product.review_summary = reviews::summary(ctx, site).await;
    product.reviews = reviews::reviews(ctx, site).await;
    product.tags = non_empty(texts_of(ctx, &sel.tags, None).await);

    Ok(product)
}

/// Breadcrumb texts with the site-wide leading crumbs dropped by position.
async fn breadcrumbs(ctx: &dyn RenderContext, site: &SiteAdapter) -> Vec<String> {
    texts_of(ctx, &site.selectors.breadcrumbs, None)
        .await
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| *idx >= site.breadcrumb_skip)
        .filter_map(|(_, text)| text.filter(|t| !t.is_empty()))
        .collect()
}

/// Elements matching `selector`; a failed query counts as no match.
pub(crate) async fn find_all(
    ctx: &dyn RenderContext,
    selector: &str,
    within: Option<ElementHandle>,
) -> Vec<ElementHandle> {
    match ctx.find_all(selector, within).await {
        Ok(found) => found,
        Err(e) => {
            debug!("query `{selector}` failed: {e:#}");
            Vec::new()
        }
    }
}

/// First element matching `selector`, if any.
pub(crate) async fn find_one(
    ctx: &dyn RenderContext,
    selector: &str,
    within: Option<ElementHandle>,
) -> Option<ElementHandle> {
    match ctx.find_one(selector, within).await {
        Ok(found) => found,
        Err(e) => {
            debug!("query `{selector}` failed: {e:#}");
            None
        }
    }
}

/// Text of the first element matching `selector`.
pub(crate) async fn text_of(
    ctx: &dyn RenderContext,
    selector: &str,
    within: Option<ElementHandle>,
) -> Option<String> {
    let el = find_one(ctx, selector, within).await?;
    match ctx.text(el).await {
        Ok(text) => Some(text),
        Err(e) => {
            debug!("text of `{selector}` unreadable: {e:#}");
            None
        }
    }
}

/// Texts of every element matching `selector`, position preserved; unreadable
/// elements are `None`.
pub(crate) async fn texts_of(
    ctx: &dyn RenderContext,
    selector: &str,
    within: Option<ElementHandle>,
) -> Vec<Option<String>> {
    let mut texts = Vec::new();
    for el in find_all(ctx, selector, within).await {
        texts.push(ctx.text(el).await.ok());
    }
    texts
}

/// Attribute of an element; absent or unreadable is `None`.
pub(crate) async fn attr_of(ctx: &dyn RenderContext, el: ElementHandle, name: &str) -> Option<String> {
    match ctx.attribute(el, name).await {
        Ok(value) => value,
        Err(e) => {
            debug!("attribute `{name}` unreadable: {e:#}");
            None
        }
    }
}

/// Readable, non-empty texts.
pub(crate) fn non_empty(texts: Vec<Option<String>>) -> Vec<String> {
    texts
        .into_iter()
        .flatten()
        .filter(|t| !t.is_empty())
        .collect()
}
