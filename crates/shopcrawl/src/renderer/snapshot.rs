// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer over stored HTML documents.
//!
//! Pages are keyed by URL and queried with `scraper`, so selector behaviour
//! matches the live site as long as the snapshot was saved after rendering.
//! Scripts are not executed: each evaluation pops the next queued result for
//! that exact script source, and unscripted evaluations yield `0`. A snapshot
//! therefore reports itself as already scrolled to the bottom.
//!
//! Used by the offline `extract` command and by tests.

use super::{ElementHandle, NavigationResult, RenderContext, Renderer};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type ScriptQueue = HashMap<String, VecDeque<Value>>;

/// Serves HTML snapshots as rendered pages.
pub struct SnapshotRenderer {
    pages: Arc<HashMap<String, String>>,
    scripts: Arc<Mutex<ScriptQueue>>,
    executed: Arc<Mutex<Vec<String>>>,
    clicks: Arc<AtomicUsize>,
    active_count: Arc<AtomicUsize>,
    failing_sessions: AtomicUsize,
    sessions_started: AtomicUsize,
}

impl SnapshotRenderer {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(HashMap::new()),
            scripts: Arc::new(Mutex::new(HashMap::new())),
            executed: Arc::new(Mutex::new(Vec::new())),
            clicks: Arc::new(AtomicUsize::new(0)),
            active_count: Arc::new(AtomicUsize::new(0)),
            failing_sessions: AtomicUsize::new(0),
            sessions_started: AtomicUsize::new(0),
        }
    }

    /// Renderer holding a single page.
    pub fn single(url: &str, html: impl Into<String>) -> Self {
        Self::new().with_page(url, html)
    }

    /// Register the document served for `url`.
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), html.into());
        self
    }

    /// Queue results returned, in order, by evaluations of `script`.
    pub fn with_script_results(self, script: &str, results: Vec<Value>) -> Self {
        if let Ok(mut queue) = self.scripts.lock() {
            queue
                .entry(script.to_string())
                .or_default()
                .extend(results);
        }
        self
    }

    /// Make the next `n` session starts fail.
    pub fn with_failing_sessions(self, n: usize) -> Self {
        self.failing_sessions.store(n, Ordering::SeqCst);
        self
    }

    /// Every script evaluated so far, across all contexts.
    pub fn executed_scripts(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Number of sessions successfully started so far.
    pub fn sessions_started(&self) -> usize {
        self.sessions_started.load(Ordering::SeqCst)
    }

    /// Number of clicks dispatched across all contexts.
    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }
}

impl Default for SnapshotRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Renderer for SnapshotRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let refused = self
            .failing_sessions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            bail!("snapshot session refused");
        }

        self.sessions_started.fetch_add(1, Ordering::SeqCst);
        self.active_count.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SnapshotContext {
            pages: Arc::clone(&self.pages),
            scripts: Arc::clone(&self.scripts),
            executed: Arc::clone(&self.executed),
            clicks: Arc::clone(&self.clicks),
            active_count: Arc::clone(&self.active_count),
            current: None,
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::SeqCst)
    }
}

/// One snapshot "tab". Holds the source of the current page; the document is
/// re-parsed per query since parsed trees cannot cross threads.
pub struct SnapshotContext {
    pages: Arc<HashMap<String, String>>,
    scripts: Arc<Mutex<ScriptQueue>>,
    executed: Arc<Mutex<Vec<String>>>,
    clicks: Arc<AtomicUsize>,
    active_count: Arc<AtomicUsize>,
    current: Option<(String, String)>,
}

impl SnapshotContext {
    fn source(&self) -> Result<&str> {
        self.current
            .as_ref()
            .map(|(_, html)| html.as_str())
            .context("no page loaded")
    }

    /// Run `f` against the element behind `handle`.
    fn with_element<R>(&self, handle: ElementHandle, f: impl FnOnce(ElementRef<'_>) -> R) -> Result<R> {
        let doc = Html::parse_document(self.source()?);
        let el = elements(&doc)
            .into_iter()
            .nth(handle.0)
            .with_context(|| format!("stale element handle {}", handle.0))?;
        Ok(f(el))
    }
}

/// All elements of `doc` in document order; handles index into this list.
fn elements(doc: &Html) -> Vec<ElementRef<'_>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect()
}

#[async_trait]
impl RenderContext for SnapshotContext {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        let html = self
            .pages
            .get(url)
            .with_context(|| format!("no snapshot for {url}"))?;
        self.current = Some((url.to_string(), html.clone()));
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 0,
        })
    }

    async fn execute_js(&self, script: &str) -> Result<Value> {
        if let Ok(mut log) = self.executed.lock() {
            log.push(script.to_string());
        }
        let mut queue = self
            .scripts
            .lock()
            .map_err(|_| anyhow!("script queue poisoned"))?;
        let next = queue.get_mut(script).and_then(VecDeque::pop_front);
        Ok(next.unwrap_or_else(|| Value::from(0)))
    }

    async fn find_all(
        &self,
        selector: &str,
        within: Option<ElementHandle>,
    ) -> Result<Vec<ElementHandle>> {
        let sel = Selector::parse(selector)
            .map_err(|e| anyhow!("invalid selector `{selector}`: {e:?}"))?;
        let doc = Html::parse_document(self.source()?);
        let all = elements(&doc);
        let index_of = |found: &ElementRef<'_>| all.iter().position(|e| e.id() == found.id());

        let handles: Vec<usize> = match within {
            None => doc.select(&sel).filter_map(|m| index_of(&m)).collect(),
            Some(ElementHandle(idx)) => {
                let scope = all
                    .get(idx)
                    .with_context(|| format!("stale element handle {idx}"))?;
                scope
                    .select(&sel)
                    .filter(|m| m.id() != scope.id())
                    .filter_map(|m| index_of(&m))
                    .collect()
            }
        };
        Ok(handles.into_iter().map(ElementHandle).collect())
    }

    async fn text(&self, element: ElementHandle) -> Result<String> {
        self.with_element(element, |el| {
            el.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    async fn attribute(&self, element: ElementHandle, name: &str) -> Result<Option<String>> {
        self.with_element(element, |el| el.value().attr(name).map(String::from))
    }

    async fn click(&self, element: ElementHandle) -> Result<()> {
        self.with_element(element, |_| ())?;
        self.clicks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_url(&self) -> Result<String> {
        Ok(self
            .current
            .as_ref()
            .map(|(url, _)| url.clone())
            .unwrap_or_default())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <ul class="nav"><li><a href="/a">Alpha</a></li><li><a href="/b">  Beta
        </a></li></ul>
        <div class="card"><img src="/x.jpg" alt="X"><span class="p">100</span></div>
        <div class="card"><img src="/y.jpg"></div>
    </body></html>"#;

    async fn loaded() -> (SnapshotRenderer, Box<dyn RenderContext>) {
        let renderer = SnapshotRenderer::single("https://shop.test/", PAGE);
        let mut ctx = renderer.new_context().await.unwrap();
        ctx.navigate("https://shop.test/", 1000).await.unwrap();
        (renderer, ctx)
    }

    #[tokio::test]
    async fn test_find_all_text_and_attributes() {
        let (_renderer, ctx) = loaded().await;
        let links = ctx.find_all(".nav li a", None).await.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(ctx.text(links[1]).await.unwrap(), "Beta");
        assert_eq!(
            ctx.attribute(links[0], "href").await.unwrap().as_deref(),
            Some("/a")
        );
        assert!(ctx.attribute(links[0], "title").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scoped_queries_stay_inside_scope() {
        let (_renderer, ctx) = loaded().await;
        let cards = ctx.find_all(".card", None).await.unwrap();
        assert_eq!(cards.len(), 2);

        let price = ctx.find_one(".p", Some(cards[0])).await.unwrap();
        assert!(price.is_some());
        assert!(ctx.find_one(".p", Some(cards[1])).await.unwrap().is_none());

        let img = ctx.find_one("img", Some(cards[1])).await.unwrap().unwrap();
        assert_eq!(ctx.attribute(img, "src").await.unwrap().as_deref(), Some("/y.jpg"));
    }

    #[tokio::test]
    async fn test_unknown_url_fails_navigation() {
        let renderer = SnapshotRenderer::new();
        let mut ctx = renderer.new_context().await.unwrap();
        assert!(ctx.navigate("https://shop.test/missing", 1000).await.is_err());
        assert!(ctx.find_all("a", None).await.is_err());
    }

    #[tokio::test]
    async fn test_scripts_replay_queue_then_zero() {
        let renderer = SnapshotRenderer::single("https://shop.test/", PAGE)
            .with_script_results("return 1;", vec![Value::from(7), Value::from(8)]);
        let ctx = renderer.new_context().await.unwrap();
        assert_eq!(ctx.execute_js("return 1;").await.unwrap(), Value::from(7));
        assert_eq!(ctx.execute_js("return 1;").await.unwrap(), Value::from(8));
        assert_eq!(ctx.execute_js("return 1;").await.unwrap(), Value::from(0));
        assert_eq!(renderer.executed_scripts().len(), 3);
    }

    #[tokio::test]
    async fn test_failing_sessions_then_success() {
        let renderer = SnapshotRenderer::new().with_failing_sessions(1);
        assert!(renderer.new_context().await.is_err());
        let ctx = renderer.new_context().await.unwrap();
        assert_eq!(renderer.active_contexts(), 1);
        assert_eq!(renderer.sessions_started(), 1);
        ctx.close().await.unwrap();
        assert_eq!(renderer.active_contexts(), 0);
        assert_eq!(renderer.sessions_started(), 1);
    }
}
