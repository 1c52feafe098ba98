// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Two-phase crawl.
//!
//! Phase 1 (listing) discovers categories and their listing pages and stores
//! one `ProductUrl` per product link. Phase 2 (detail) reads a batch of stored
//! product URLs back and stores one `Product` per page. Each phase is a
//! [`Dispatcher`] run whose workers each own one rendering session.

pub mod detail;
pub mod listing;

use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::pool::{Dispatcher, PoolReport};
use crate::progress::{Phase, Progress, ProgressEventKind};
use crate::renderer::Renderer;
use crate::site::SiteAdapter;
use crate::store::RecordStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Everything a worker needs, cheap to clone into each one.
#[derive(Clone)]
pub struct CrawlContext {
    pub renderer: Arc<dyn Renderer>,
    pub store: Arc<dyn RecordStore>,
    pub site: Arc<SiteAdapter>,
    pub config: Arc<CrawlConfig>,
    pub progress: Progress,
}

impl CrawlContext {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        store: Arc<dyn RecordStore>,
        site: SiteAdapter,
        config: CrawlConfig,
        progress: Progress,
    ) -> Self {
        Self {
            renderer,
            store,
            site: Arc::new(site),
            config: Arc::new(config),
            progress,
        }
    }

    fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.config.workers, self.config.queue_capacity)
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// `None` when discovery was skipped because URLs were already stored.
    pub listing: Option<PoolReport>,
    pub detail: PoolReport,
}

/// Run discovery if needed, then extract a batch of stored product URLs.
pub async fn run_crawl(cx: &CrawlContext) -> Result<CrawlSummary, CrawlError> {
    cx.config.validate()?;

    let stored = cx.store.count_product_urls()?;
    let listing = if stored == 0 || cx.config.force_discovery {
        Some(run_listing_phase(cx).await?)
    } else {
        info!("{stored} product URL(s) already stored; skipping discovery");
        None
    };

    let detail = run_detail_phase(cx).await?;
    Ok(CrawlSummary { listing, detail })
}

/// Phase 1: discovery feeds listing pages to the listing workers.
pub async fn run_listing_phase(cx: &CrawlContext) -> Result<PoolReport, CrawlError> {
    let started = Instant::now();
    info!(
        run_id = cx.progress.run_id(),
        workers = cx.config.workers,
        "listing phase started"
    );
    cx.progress.emit(ProgressEventKind::PhaseStarted {
        phase: Phase::Listing,
        workers: cx.config.workers,
    });

    let producer_cx = cx.clone();
    let report = cx
        .dispatcher()
        .run(
            |tx| async move { listing::produce(&producer_cx, tx).await },
            |idx, queue| listing::worker(idx, queue, cx.clone()),
        )
        .await?;

    finish_phase(cx, Phase::Listing, &report, started);
    Ok(report)
}

/// Phase 2: stored product URLs (up to the batch size) are fed to the detail
/// workers. An empty batch starts no sessions.
pub async fn run_detail_phase(cx: &CrawlContext) -> Result<PoolReport, CrawlError> {
    let started = Instant::now();
    let batch = cx.store.find_product_urls(cx.config.batch_size)?;
    if batch.is_empty() {
        info!(run_id = cx.progress.run_id(), "no product URLs stored; skipping detail phase");
        return Ok(PoolReport::default());
    }
    info!(
        run_id = cx.progress.run_id(),
        workers = cx.config.workers,
        batch = batch.len(),
        "detail phase started"
    );
    cx.progress.emit(ProgressEventKind::PhaseStarted {
        phase: Phase::Detail,
        workers: cx.config.workers,
    });

    let progress = cx.progress.clone();
    let report = cx
        .dispatcher()
        .run(
            |tx| async move {
                let mut queued = 0;
                for record in batch {
                    let url = record.url.clone();
                    if !tx.send(record).await {
                        break;
                    }
                    queued += 1;
                    progress.emit(ProgressEventKind::TaskQueued {
                        phase: Phase::Detail,
                        url,
                    });
                }
                Ok::<usize, CrawlError>(queued)
            },
            |idx, queue| detail::worker(idx, queue, cx.clone()),
        )
        .await?;

    finish_phase(cx, Phase::Detail, &report, started);
    Ok(report)
}

fn finish_phase(cx: &CrawlContext, phase: Phase, report: &PoolReport, started: Instant) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        %phase,
        queued = report.queued,
        processed = report.processed(),
        stored = report.stored(),
        skipped = report.skipped(),
        aborted_workers = report.aborted_workers(),
        elapsed_ms,
        "phase completed"
    );
    cx.progress.emit(ProgressEventKind::PhaseCompleted {
        phase,
        processed: report.processed(),
        stored: report.stored(),
        skipped: report.skipped(),
        elapsed_ms,
    });
}
