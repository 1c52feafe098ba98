// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! `shopcrawl crawl`: run both phases against the live site.

use crate::cli::output;
use crate::config::CrawlConfig;
use crate::crawl::{self, CrawlContext, CrawlSummary};
use crate::discovery::CategorySelection;
use crate::pool::PoolReport;
use crate::progress::{self, Phase, Progress, ProgressEventKind, ProgressReceiver};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::Renderer;
use crate::site::SiteAdapter;
use crate::store::{RecordStore, SqliteStore};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::info;

/// Flags of the crawl command.
#[derive(Debug, Clone, Default)]
pub struct CrawlArgs {
    pub workers: Option<usize>,
    pub batch: Option<usize>,
    pub all_categories: bool,
    pub category: Option<usize>,
    pub force_discovery: bool,
    pub headful: bool,
    pub site: Option<PathBuf>,
    pub db: Option<PathBuf>,
}

impl CrawlArgs {
    /// Layer the flags over `config`.
    pub fn apply(&self, config: &mut CrawlConfig) {
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(batch) = self.batch {
            config.batch_size = batch;
        }
        if self.all_categories {
            config.categories = CategorySelection::All;
        } else if let Some(index) = self.category {
            config.categories = CategorySelection::Index(index);
        }
        config.force_discovery |= self.force_discovery;
        config.headful |= self.headful;
        if let Some(ref db) = self.db {
            config.db_path = db.clone();
        }
    }
}

/// Load the site adapter from `--site`, or the built-in one.
pub fn load_site(path: Option<&PathBuf>) -> Result<SiteAdapter> {
    match path {
        Some(path) => SiteAdapter::from_file(path).context("failed to load site adapter"),
        None => Ok(SiteAdapter::default()),
    }
}

/// Run the crawl command.
pub async fn run(args: CrawlArgs) -> Result<()> {
    let mut config = CrawlConfig::from_env()?;
    args.apply(&mut config);
    config.validate()?;
    let site = load_site(args.site.as_ref())?;

    let store: Arc<dyn RecordStore> = Arc::new(
        SqliteStore::open(&config.db_path)
            .with_context(|| format!("failed to open store {}", config.db_path.display()))?,
    );
    let renderer = Arc::new(
        ChromiumRenderer::new(config.headful)
            .await
            .context("failed to launch Chromium")?,
    );

    let run_id = uuid::Uuid::new_v4().to_string();
    info!(run_id = %run_id, db = %config.db_path.display(), "starting crawl");

    let (tx, rx) = progress::channel();
    let spinner = (!output::is_quiet()).then(|| spawn_spinner(rx));

    let cx = CrawlContext::new(
        renderer.clone(),
        store,
        site,
        config,
        Progress::new(Some(tx), run_id.clone()),
    );
    let result = crawl::run_crawl(&cx).await;

    // Closing the last sender ends the spinner task.
    drop(cx);
    if let Some(handle) = spinner {
        let _ = handle.await;
    }
    renderer.shutdown().await.ok();

    let summary = result.context("crawl failed")?;
    report(&run_id, &summary);
    Ok(())
}

fn report(run_id: &str, summary: &CrawlSummary) {
    if output::is_json() {
        output::print_json(&serde_json::json!({
            "run_id": run_id,
            "listing": summary.listing.as_ref().map(report_json),
            "detail": report_json(&summary.detail),
        }));
        return;
    }
    if output::is_quiet() {
        return;
    }

    match &summary.listing {
        Some(listing) => println!(
            "  listing: {} page(s), {} product URL(s) stored, {} skipped",
            listing.processed(),
            listing.stored(),
            listing.skipped()
        ),
        None => println!("  listing: skipped (product URLs already stored)"),
    }
    let detail = &summary.detail;
    println!(
        "  detail:  {} page(s), {} product(s) stored, {} skipped",
        detail.processed(),
        detail.stored(),
        detail.skipped()
    );
    if detail.aborted_workers() > 0 {
        println!(
            "  warning: {} detail worker(s) could not start a session",
            detail.aborted_workers()
        );
    }
}

fn report_json(report: &PoolReport) -> serde_json::Value {
    serde_json::json!({
        "queued": report.queued,
        "processed": report.processed(),
        "stored": report.stored(),
        "skipped": report.skipped(),
        "aborted_workers": report.aborted_workers(),
    })
}

/// Spinner fed by progress events until the channel closes.
fn spawn_spinner(mut rx: ProgressReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(120));

        let mut phase = Phase::Listing;
        let (mut urls, mut products, mut skipped) = (0usize, 0usize, 0usize);
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };
            match event.event {
                ProgressEventKind::PhaseStarted { phase: p, .. } => phase = p,
                ProgressEventKind::ProductUrlStored { .. } => urls += 1,
                ProgressEventKind::ProductStored { .. } => products += 1,
                ProgressEventKind::TaskSkipped { .. } => skipped += 1,
                ProgressEventKind::PhaseCompleted {
                    phase: p,
                    processed,
                    elapsed_ms,
                    ..
                } => bar.println(format!(
                    "  {p} phase done: {processed} page(s) in {:.1}s",
                    elapsed_ms as f64 / 1000.0
                )),
                _ => {}
            }
            bar.set_message(format!(
                "{phase}: {urls} product URL(s), {products} product(s), {skipped} skipped"
            ));
        }
        bar.finish_and_clear();
    })
}
