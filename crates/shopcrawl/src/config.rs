// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run configuration.
//!
//! Precedence, lowest first: built-in defaults, `SHOPCRAWL_*` environment
//! variables, CLI flags.

use crate::discovery::CategorySelection;
use crate::error::CrawlError;
use crate::interact::ScrollSettings;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB: &str = "SHOPCRAWL_DB";
pub const ENV_WORKERS: &str = "SHOPCRAWL_WORKERS";

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Workers per phase, each owning one rendering session.
    pub workers: usize,
    /// Maximum number of stored product URLs loaded for phase 2.
    pub batch_size: usize,
    /// Capacity of the bounded task queue.
    pub queue_capacity: usize,
    pub navigation_timeout: Duration,
    /// Flat pause after navigation and after scrolling.
    pub settle: Duration,
    pub scroll: ScrollSettings,
    pub categories: CategorySelection,
    /// Run discovery even when product URLs are already stored.
    pub force_discovery: bool,
    pub headful: bool,
    pub db_path: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            batch_size: 300,
            queue_capacity: 1,
            navigation_timeout: Duration::from_secs(30),
            settle: Duration::from_secs(5),
            scroll: ScrollSettings::default(),
            categories: CategorySelection::default(),
            force_discovery: false,
            headful: false,
            db_path: crate::store::sqlite::default_path(),
        }
    }
}

impl CrawlConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, CrawlError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), CrawlError> {
        if let Some(db) = lookup(ENV_DB).filter(|v| !v.is_empty()) {
            self.db_path = PathBuf::from(db);
        }
        if let Some(workers) = lookup(ENV_WORKERS).filter(|v| !v.is_empty()) {
            self.workers = workers.trim().parse().map_err(|_| {
                CrawlError::Config(format!("{ENV_WORKERS} must be a positive integer, got `{workers}`"))
            })?;
        }
        Ok(())
    }

    pub fn navigation_timeout_ms(&self) -> u64 {
        self.navigation_timeout.as_millis() as u64
    }

    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.workers == 0 {
            return Err(CrawlError::Config("workers must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(CrawlError::Config("queue capacity must be at least 1".into()));
        }
        if self.scroll.max_steps == 0 {
            return Err(CrawlError::Config("max scroll steps must be at least 1".into()));
        }
        Ok(())
    }

    /// Zero settle delays, for snapshot rendering where nothing loads lazily.
    pub fn without_delays(mut self) -> Self {
        self.settle = Duration::ZERO;
        self.scroll.settle = Duration::ZERO;
        self
    }
}
