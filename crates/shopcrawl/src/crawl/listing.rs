// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Phase 1: category discovery and listing-page workers.

use super::CrawlContext;
use crate::discovery::{self, category_of, page_number};
use crate::error::CrawlError;
use crate::interact;
use crate::model::ProductUrl;
use crate::pool::{TaskQueue, TaskSender, WorkerReport};
use crate::progress::{Phase, ProgressEventKind};
use crate::renderer::RenderContext;
use tracing::{debug, info, warn};

/// Discover categories and queue every listing page of the selected ones.
///
/// Runs in its own session. Failing to start it, or to load the root or a
/// category page, ends the run.
pub async fn produce(cx: &CrawlContext, tx: TaskSender<String>) -> Result<usize, CrawlError> {
    let mut ctx = cx
        .renderer
        .new_context()
        .await
        .map_err(|e| CrawlError::SessionStart(format!("discovery session: {e:#}")))?;

    let result = enumerate_pages(ctx.as_mut(), cx, &tx).await;
    if let Err(e) = ctx.close().await {
        debug!("failed to close discovery session: {e:#}");
    }
    result
}

async fn enumerate_pages(
    ctx: &mut dyn RenderContext,
    cx: &CrawlContext,
    tx: &TaskSender<String>,
) -> Result<usize, CrawlError> {
    let timeout_ms = cx.config.navigation_timeout_ms();
    let categories = discovery::discover_categories(ctx, &cx.site, timeout_ms, cx.config.settle).await?;
    let selected = cx.config.categories.apply(categories);
    if selected.is_empty() {
        warn!("no category matches {:?}", cx.config.categories);
    }

    let mut queued = 0;
    for category in selected {
        let pages = discovery::category_pages(ctx, &cx.site, &category, timeout_ms).await?;
        for page in pages {
            if !tx.send(page.clone()).await {
                warn!("listing workers are gone; stopping discovery");
                return Ok(queued);
            }
            queued += 1;
            cx.progress.emit(ProgressEventKind::TaskQueued {
                phase: Phase::Listing,
                url: page,
            });
        }
    }

    info!("queued {queued} listing page(s)");
    Ok(queued)
}

/// Listing worker: one session, pages pulled from `queue` until it closes.
///
/// A session that cannot start, or that breaks mid-run, fails the whole run.
pub async fn worker(
    idx: usize,
    queue: TaskQueue<String>,
    cx: CrawlContext,
) -> Result<WorkerReport, CrawlError> {
    let mut ctx = cx.renderer.new_context().await.map_err(|e| {
        CrawlError::SessionStart(format!("listing worker {idx}: {e:#}"))
    })?;
    debug!(worker = idx, "listing worker started");

    let mut report = WorkerReport::default();
    let result = drain(idx, &queue, ctx.as_mut(), &cx, &mut report).await;
    if let Err(e) = ctx.close().await {
        debug!(worker = idx, "failed to close session: {e:#}");
    }
    result?;

    cx.progress.emit(ProgressEventKind::WorkerExited {
        phase: Phase::Listing,
        worker: idx,
        processed: report.processed,
        aborted: report.aborted,
    });
    Ok(report)
}

async fn drain(
    idx: usize,
    queue: &TaskQueue<String>,
    ctx: &mut dyn RenderContext,
    cx: &CrawlContext,
    report: &mut WorkerReport,
) -> Result<(), CrawlError> {
    while let Some(url) = queue.recv().await {
        report.processed += 1;
        match process_page(idx, ctx, cx, &url).await {
            Ok(stored) => report.stored += stored,
            Err(e) if e.is_worker_fatal() => return Err(e),
            Err(e) => {
                warn!(worker = idx, url = %url, "skipping listing page: {e}");
                report.skipped += 1;
                cx.progress.emit(ProgressEventKind::TaskSkipped {
                    phase: Phase::Listing,
                    worker: idx,
                    url,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Render one listing page and store its product links. Returns how many
/// were stored.
async fn process_page(
    idx: usize,
    ctx: &mut dyn RenderContext,
    cx: &CrawlContext,
    url: &str,
) -> Result<usize, CrawlError> {
    ctx.navigate(url, cx.config.navigation_timeout_ms())
        .await
        .map_err(|e| CrawlError::Navigation {
            url: url.to_string(),
            reason: format!("{e:#}"),
        })?;

    interact::dismiss_modals(&*ctx, &cx.site.selectors.modal_close).await;
    interact::scroll_to_bottom(&*ctx, &cx.config.scroll).await?;
    if !cx.config.settle.is_zero() {
        tokio::time::sleep(cx.config.settle).await;
    }

    let links = ctx
        .find_all(&cx.site.selectors.product_links, None)
        .await
        .map_err(|e| CrawlError::Navigation {
            url: url.to_string(),
            reason: format!("product link query failed: {e:#}"),
        })?;

    let (Some(page_no), category) = (page_number(url), category_of(url)) else {
        return Err(CrawlError::ListingUrl {
            url: url.to_string(),
            param: "page",
        });
    };
    if category.is_empty() {
        return Err(CrawlError::ListingUrl {
            url: url.to_string(),
            param: "category",
        });
    }

    let mut stored = 0;
    for link in links {
        let href = match ctx.attribute(link, "href").await {
            Ok(Some(href)) if !href.is_empty() => href,
            _ => continue,
        };
        let record = ProductUrl {
            category: category.clone(),
            page_no,
            url: cx.site.resolve(&href),
        };
        match cx.store.insert_product_url(&record) {
            Ok(()) => {
                stored += 1;
                cx.progress.emit(ProgressEventKind::ProductUrlStored {
                    worker: idx,
                    url: record.url,
                });
            }
            Err(e) => warn!(worker = idx, "failed to store {}: {e}", record.url),
        }
    }

    debug!(worker = idx, url, stored, "listing page done");
    Ok(stored)
}
