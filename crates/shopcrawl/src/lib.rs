// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Two-phase catalog crawler.
//!
//! Phase 1 walks a catalog's categories and listing pages with a pool of
//! rendering sessions and stores every product link. Phase 2 feeds the stored
//! links to a second pool that renders each product page and runs a
//! fault-tolerant field extraction pipeline over it.

pub mod cli;
pub mod config;
pub mod crawl;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod interact;
pub mod model;
pub mod pool;
pub mod progress;
pub mod renderer;
pub mod site;
pub mod store;

pub use config::CrawlConfig;
pub use crawl::{run_crawl, CrawlContext, CrawlSummary};
pub use error::CrawlError;
pub use model::{Product, ProductUrl};
pub use site::SiteAdapter;
