// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Failure classes for the crawl pipeline.
//!
//! Field-level misses never surface here: the extraction pipeline degrades
//! those to zero values. Everything in [`CrawlError`] means a session, a page
//! or a record is unusable.

/// All hard failures the crawler can report.
#[derive(thiserror::Error, Debug)]
pub enum CrawlError {
    #[error("failed to start rendering session: {0}")]
    SessionStart(String),

    #[error("failed to load root page {url}: {reason}")]
    RootPage { url: String, reason: String },

    #[error("navigation region `{selector}` not found on {url}")]
    NavigationMissing { url: String, selector: String },

    #[error("failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// The page loaded but its URL lacks a parameter the record needs.
    #[error("listing URL {url} has no {param}= parameter")]
    ListingUrl { url: String, param: &'static str },

    #[error("script execution failed: {0}")]
    Script(String),

    #[error("size chart geometry mismatch: {0}")]
    SizeChartGeometry(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("worker {worker} failed: {reason}")]
    Worker { worker: usize, reason: String },
}

impl CrawlError {
    /// Whether this failure leaves the worker's session unusable.
    pub fn is_worker_fatal(&self) -> bool {
        matches!(
            self,
            CrawlError::SessionStart(_) | CrawlError::Script(_) | CrawlError::Worker { .. }
        )
    }
}

impl From<rusqlite::Error> for CrawlError {
    fn from(e: rusqlite::Error) -> Self {
        CrawlError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for CrawlError {
    fn from(e: serde_json::Error) -> Self {
        CrawlError::Store(format!("document encoding: {e}"))
    }
}
