// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Document store for crawl output.
//!
//! Two collections: `ProductUrl` documents written by phase 1 and read back to
//! seed phase 2, and `Product` documents written by phase 2. Inserts are
//! independent single-document writes with no dedup key; running discovery
//! twice stores every link twice.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::CrawlError;
use crate::model::{Product, ProductUrl};

/// Storage shared by every worker of a run.
pub trait RecordStore: Send + Sync {
    fn insert_product_url(&self, record: &ProductUrl) -> Result<(), CrawlError>;

    fn insert_product(&self, record: &Product) -> Result<(), CrawlError>;

    /// Stored product URLs in insertion order, at most `limit`.
    fn find_product_urls(&self, limit: usize) -> Result<Vec<ProductUrl>, CrawlError>;

    fn count_product_urls(&self) -> Result<usize, CrawlError>;

    fn count_products(&self) -> Result<usize, CrawlError>;

    /// Stored products in insertion order, at most `limit`.
    fn products(&self, limit: usize) -> Result<Vec<Product>, CrawlError>;
}
