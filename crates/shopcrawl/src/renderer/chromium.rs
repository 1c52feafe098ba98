// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.

use super::{ElementHandle, NavigationResult, RenderContext, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. SHOPCRAWL_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SHOPCRAWL_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.shopcrawl/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".shopcrawl/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".shopcrawl/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".shopcrawl/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".shopcrawl/chromium/chrome-linux64/chrome"),
                home.join(".shopcrawl/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Launch a Chromium instance. `headful` opens a visible full-size window.
    pub async fn new(headful: bool) -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set SHOPCRAWL_CHROMIUM_PATH or install Chrome.")?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(1920, 1080)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if headful {
            builder = builder.with_head().arg("--start-fullscreen");
        } else {
            builder = builder.arg("--headless=new");
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drive the CDP connection
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumContext {
            page,
            elements: Mutex::new(Vec::new()),
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        // Browser is dropped when ChromiumRenderer is dropped
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single Chromium page context.
///
/// Elements found on the page are kept in a registry; handles index into it.
/// The registry is cleared on navigation.
pub struct ChromiumContext {
    page: Page,
    elements: Mutex<Vec<Element>>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumContext {
    fn register(registry: &mut Vec<Element>, found: Vec<Element>) -> Vec<ElementHandle> {
        let start = registry.len();
        registry.extend(found);
        (start..registry.len()).map(ElementHandle).collect()
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        self.elements.get_mut().clear();
        let start = Instant::now();

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_)) => {
                let _ = self.page.wait_for_navigation().await;

                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn find_all(
        &self,
        selector: &str,
        within: Option<ElementHandle>,
    ) -> Result<Vec<ElementHandle>> {
        let mut registry = self.elements.lock().await;
        let found = match within {
            None => self
                .page
                .find_elements(selector)
                .await
                .with_context(|| format!("query failed: {selector}"))?,
            Some(ElementHandle(idx)) => {
                let parent = registry
                    .get(idx)
                    .with_context(|| format!("stale element handle {idx}"))?;
                parent
                    .find_elements(selector)
                    .await
                    .with_context(|| format!("scoped query failed: {selector}"))?
            }
        };
        Ok(Self::register(&mut registry, found))
    }

    async fn text(&self, element: ElementHandle) -> Result<String> {
        let registry = self.elements.lock().await;
        let el = registry
            .get(element.0)
            .with_context(|| format!("stale element handle {}", element.0))?;
        let text = el.inner_text().await.context("failed to read text")?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn attribute(&self, element: ElementHandle, name: &str) -> Result<Option<String>> {
        let registry = self.elements.lock().await;
        let el = registry
            .get(element.0)
            .with_context(|| format!("stale element handle {}", element.0))?;
        el.attribute(name)
            .await
            .with_context(|| format!("failed to read attribute {name}"))
    }

    async fn click(&self, element: ElementHandle) -> Result<()> {
        let registry = self.elements.lock().await;
        let el = registry
            .get(element.0)
            .with_context(|| format!("stale element handle {}", element.0))?;
        el.click().await.context("click failed")?;
        Ok(())
    }

    async fn get_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("failed to get URL")?
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(url)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        let _ = self.page.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_find_text_and_attribute() {
        let renderer = ChromiumRenderer::new(false)
            .await
            .expect("failed to create renderer");
        let mut ctx = renderer
            .new_context()
            .await
            .expect("failed to create context");

        ctx.navigate(
            "data:text/html,<ul class='nav'><li><a href='/a'>A</a></li><li><a href='/b'>B</a></li></ul>",
            10000,
        )
        .await
        .expect("navigation failed");

        let links = ctx.find_all(".nav a", None).await.expect("query failed");
        assert_eq!(links.len(), 2);
        assert_eq!(ctx.text(links[1]).await.unwrap(), "B");
        assert_eq!(
            ctx.attribute(links[0], "href").await.unwrap().as_deref(),
            Some("/a")
        );
        assert!(ctx.find_one(".missing", None).await.unwrap().is_none());

        ctx.close().await.expect("close failed");
        assert_eq!(renderer.active_contexts(), 0);
    }
}
