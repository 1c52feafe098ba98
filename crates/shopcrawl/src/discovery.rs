// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Category and pagination discovery.
//!
//! The catalog root page links every category from its navigation bar. Each
//! category page reports how many listing pages it has; a listing page URL is
//! the category URL with a `page=N` query parameter.

use crate::error::CrawlError;
use crate::renderer::RenderContext;
use crate::site::SiteAdapter;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Which of the discovered categories to crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategorySelection {
    /// Only the category at this position in the navigation bar.
    Index(usize),
    All,
}

impl Default for CategorySelection {
    fn default() -> Self {
        CategorySelection::Index(1)
    }
}

impl CategorySelection {
    pub fn apply(&self, categories: Vec<String>) -> Vec<String> {
        match *self {
            CategorySelection::All => categories,
            CategorySelection::Index(i) => categories.into_iter().nth(i).into_iter().collect(),
        }
    }
}

fn page_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"page=(\d+)").expect("page regex is valid"))
}

fn category_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"category=([^&]+)").expect("category regex is valid"))
}

/// The `page=N` parameter of a listing URL.
pub fn page_number(url: &str) -> Option<u32> {
    let caps = page_re().captures(url)?;
    caps.get(1)?.as_str().parse().ok()
}

/// The `category=X` parameter of a listing URL, or an empty string.
pub fn category_of(url: &str) -> String {
    category_re()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Listing page URLs `page=1..=count` for a category.
pub fn page_urls(category_url: &str, count: u32) -> Vec<String> {
    let sep = if category_url.contains('?') { '&' } else { '?' };
    (1..=count)
        .map(|page| format!("{category_url}{sep}page={page}"))
        .collect()
}

/// Load the catalog root and collect category URLs from its navigation bar.
///
/// A root page that fails to load, or that has no navigation links, is fatal:
/// nothing else can be discovered without it.
pub async fn discover_categories(
    ctx: &mut dyn RenderContext,
    site: &SiteAdapter,
    timeout_ms: u64,
    settle: Duration,
) -> Result<Vec<String>, CrawlError> {
    let root = site.root_url();
    ctx.navigate(&root, timeout_ms)
        .await
        .map_err(|e| CrawlError::RootPage {
            url: root.clone(),
            reason: format!("{e:#}"),
        })?;
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }

    let links = ctx
        .find_all(&site.selectors.category_links, None)
        .await
        .map_err(|e| CrawlError::RootPage {
            url: root.clone(),
            reason: format!("{e:#}"),
        })?;
    if links.is_empty() {
        return Err(CrawlError::NavigationMissing {
            url: root,
            selector: site.selectors.category_links.clone(),
        });
    }

    let mut categories = Vec::new();
    for link in links {
        match ctx.attribute(link, "href").await {
            Ok(Some(href)) if !href.is_empty() => categories.push(site.resolve(&href)),
            Ok(_) => {}
            Err(e) => warn!("failed to read category href: {e:#}"),
        }
    }

    info!("discovered {} categories on {root}", categories.len());
    Ok(categories)
}

/// Number of listing pages reported on the current category page (at least 1).
pub async fn page_count(ctx: &dyn RenderContext, site: &SiteAdapter) -> u32 {
    let total = match ctx.find_one(&site.selectors.page_total, None).await {
        Ok(Some(el)) => ctx.text(el).await.ok(),
        Ok(None) => None,
        Err(e) => {
            debug!("page total lookup failed: {e:#}");
            None
        }
    };

    total
        .and_then(|text| text.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}

/// Load a category page and enumerate its listing page URLs.
pub async fn category_pages(
    ctx: &mut dyn RenderContext,
    site: &SiteAdapter,
    category_url: &str,
    timeout_ms: u64,
) -> Result<Vec<String>, CrawlError> {
    ctx.navigate(category_url, timeout_ms)
        .await
        .map_err(|e| CrawlError::Navigation {
            url: category_url.to_string(),
            reason: format!("{e:#}"),
        })?;

    let count = page_count(&*ctx, site).await;
    info!("{category_url}: {count} listing page(s)");
    Ok(page_urls(category_url, count))
}
