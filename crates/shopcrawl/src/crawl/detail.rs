// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Phase 2: product-page workers.

use super::CrawlContext;
use crate::error::CrawlError;
use crate::extract;
use crate::interact;
use crate::model::{Product, ProductUrl};
use crate::pool::{TaskQueue, WorkerReport};
use crate::progress::{Phase, ProgressEventKind};
use crate::renderer::RenderContext;
use tracing::{debug, error, info, warn};

/// Detail worker: one session, product URLs pulled from `queue` until it
/// closes.
///
/// Unlike listing workers, a session that cannot start only takes this worker
/// out; the rest of the pool keeps draining the queue.
pub async fn worker(
    idx: usize,
    queue: TaskQueue<ProductUrl>,
    cx: CrawlContext,
) -> Result<WorkerReport, CrawlError> {
    let mut report = WorkerReport::default();

    let mut ctx = match cx.renderer.new_context().await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(worker = idx, "failed to start session, worker exits: {e:#}");
            report.aborted = true;
            exited(&cx, idx, &report);
            return Ok(report);
        }
    };
    debug!(worker = idx, "detail worker started");

    let result = drain(idx, &queue, ctx.as_mut(), &cx, &mut report).await;
    if let Err(e) = ctx.close().await {
        debug!(worker = idx, "failed to close session: {e:#}");
    }
    result?;

    exited(&cx, idx, &report);
    Ok(report)
}

fn exited(cx: &CrawlContext, idx: usize, report: &WorkerReport) {
    cx.progress.emit(ProgressEventKind::WorkerExited {
        phase: Phase::Detail,
        worker: idx,
        processed: report.processed,
        aborted: report.aborted,
    });
}

async fn drain(
    idx: usize,
    queue: &TaskQueue<ProductUrl>,
    ctx: &mut dyn RenderContext,
    cx: &CrawlContext,
    report: &mut WorkerReport,
) -> Result<(), CrawlError> {
    while let Some(task) = queue.recv().await {
        report.processed += 1;

        let outcome = match scrape(ctx, cx, &task.url).await {
            Ok(product) => cx.store.insert_product(&product),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => {
                info!(worker = idx, "stored product {}", task.url);
                report.stored += 1;
                cx.progress.emit(ProgressEventKind::ProductStored {
                    worker: idx,
                    url: task.url,
                });
            }
            Err(e) if e.is_worker_fatal() => return Err(e),
            Err(e) => {
                warn!(worker = idx, url = %task.url, "skipping product: {e}");
                report.skipped += 1;
                cx.progress.emit(ProgressEventKind::TaskSkipped {
                    phase: Phase::Detail,
                    worker: idx,
                    url: task.url,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Bring the product page into its fully attached state, then extract it.
async fn scrape(ctx: &mut dyn RenderContext, cx: &CrawlContext, url: &str) -> Result<Product, CrawlError> {
    ctx.navigate(url, cx.config.navigation_timeout_ms())
        .await
        .map_err(|e| CrawlError::Navigation {
            url: url.to_string(),
            reason: format!("{e:#}"),
        })?;
    settle(cx).await;

    let ctx: &dyn RenderContext = ctx;
    let sel = &cx.site.selectors;
    interact::expand_gallery(ctx, &sel.gallery_wrapper, &cx.site.gallery_expand_class).await;
    interact::dismiss_modals(ctx, &sel.modal_close).await;
    interact::scroll_to_bottom(ctx, &cx.config.scroll).await?;
    settle(cx).await;

    extract::extract_product(ctx, &cx.site, url).await
}

async fn settle(cx: &CrawlContext) {
    if !cx.config.settle.is_zero() {
        tokio::time::sleep(cx.config.settle).await;
    }
}
