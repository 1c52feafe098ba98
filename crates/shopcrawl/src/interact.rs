// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page interaction primitives run before any extraction.
//!
//! Listing and product pages load their content lazily while scrolling, and
//! may open promotional modals on arrival. These helpers bring a freshly
//! navigated page into a state where every element the selectors expect is
//! attached.

use crate::error::CrawlError;
use crate::renderer::RenderContext;
use std::time::Duration;
use tracing::{debug, warn};

// Scripts are evaluated as expressions and must produce a value.
pub const SCROLL_TOP_JS: &str = "document.documentElement.scrollTop";
pub const CLIENT_HEIGHT_JS: &str = "document.documentElement.clientHeight";
pub const SCROLL_HEIGHT_JS: &str = "document.documentElement.scrollHeight";

/// Scroll loop parameters.
#[derive(Debug, Clone, Copy)]
pub struct ScrollSettings {
    /// Pixels per `scrollBy` step.
    pub step_px: u32,
    /// Pause after each step before measuring.
    pub settle: Duration,
    /// Upper bound on steps before giving up.
    pub max_steps: u32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            step_px: 1000,
            settle: Duration::from_secs(5),
            max_steps: 200,
        }
    }
}

/// How a scroll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// `scrollTop + clientHeight >= scrollHeight` after `steps` steps.
    Converged { steps: u32 },
    /// `max_steps` were issued without reaching the bottom.
    Exhausted { steps: u32 },
}

/// Viewport measurements taken after a scroll step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    pub fn at_bottom(&self) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height
    }
}

fn scroll_by_js(step_px: u32) -> String {
    format!("(window.scrollBy(0, {step_px}), true)")
}

async fn read_metric(ctx: &dyn RenderContext, script: &str) -> Result<f64, CrawlError> {
    let value = ctx
        .execute_js(script)
        .await
        .map_err(|e| CrawlError::Script(format!("{script}: {e:#}")))?;
    value
        .as_f64()
        .ok_or_else(|| CrawlError::Script(format!("{script}: non-numeric result {value}")))
}

/// Read `scrollTop`, `clientHeight` and `scrollHeight`.
pub async fn read_metrics(ctx: &dyn RenderContext) -> Result<ScrollMetrics, CrawlError> {
    Ok(ScrollMetrics {
        scroll_top: read_metric(ctx, SCROLL_TOP_JS).await?,
        client_height: read_metric(ctx, CLIENT_HEIGHT_JS).await?,
        scroll_height: read_metric(ctx, SCROLL_HEIGHT_JS).await?,
    })
}

/// Scroll until the viewport touches the bottom of the document.
///
/// Each step scrolls, waits `settle`, then measures. Script failures mean the
/// session is broken and are returned as [`CrawlError::Script`]; running out
/// of steps is a normal outcome.
pub async fn scroll_to_bottom(
    ctx: &dyn RenderContext,
    settings: &ScrollSettings,
) -> Result<ScrollOutcome, CrawlError> {
    let scroll_js = scroll_by_js(settings.step_px);
    let mut steps = 0;

    while steps < settings.max_steps {
        ctx.execute_js(&scroll_js)
            .await
            .map_err(|e| CrawlError::Script(format!("scroll step failed: {e:#}")))?;
        steps += 1;

        if !settings.settle.is_zero() {
            tokio::time::sleep(settings.settle).await;
        }

        let metrics = read_metrics(ctx).await?;
        if metrics.at_bottom() {
            debug!("scroll converged after {steps} step(s)");
            return Ok(ScrollOutcome::Converged { steps });
        }
    }

    warn!("scroll did not reach the bottom after {steps} step(s)");
    Ok(ScrollOutcome::Exhausted { steps })
}

/// Click every modal close button. Best effort: returns how many clicks landed.
pub async fn dismiss_modals(ctx: &dyn RenderContext, selector: &str) -> usize {
    let buttons = match ctx.find_all(selector, None).await {
        Ok(buttons) => buttons,
        Err(e) => {
            debug!("modal lookup failed: {e:#}");
            return 0;
        }
    };

    let mut closed = 0;
    for button in buttons {
        match ctx.click(button).await {
            Ok(()) => {
                closed += 1;
                debug!("modal closed");
            }
            Err(e) => debug!("modal close click failed: {e:#}"),
        }
    }
    closed
}

/// Add `class` to the gallery wrapper so collapsed media gets attached.
/// Returns whether the wrapper was found and the script ran.
pub async fn expand_gallery(ctx: &dyn RenderContext, selector: &str, class: &str) -> bool {
    match ctx.find_one(selector, None).await {
        Ok(Some(_)) => {}
        Ok(None) => return false,
        Err(e) => {
            debug!("gallery lookup failed: {e:#}");
            return false;
        }
    }

    let script = format!(
        "!!document.querySelector({sel}) && (document.querySelector({sel}).classList.add({cls}), true)",
        sel = serde_json::Value::from(selector),
        cls = serde_json::Value::from(class),
    );
    match ctx.execute_js(&script).await {
        Ok(_) => true,
        Err(e) => {
            warn!("failed to expand gallery `{selector}`: {e:#}");
            false
        }
    }
}
