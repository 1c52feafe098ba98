// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over the
//! browser engine. The crawl pipeline only ever talks to these traits:
//! Chromium (via chromiumoxide) in production, stored HTML snapshots in tests
//! and offline extraction.

pub mod chromium;
pub mod snapshot;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// Opaque reference to an element found on the current page.
///
/// Handles are only valid until the next navigation of the context that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub(crate) usize);

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// All elements matching `selector`, in document order, optionally
    /// restricted to the subtree of `within`. No match is an empty list.
    async fn find_all(
        &self,
        selector: &str,
        within: Option<ElementHandle>,
    ) -> Result<Vec<ElementHandle>>;
    /// First element matching `selector`, if any.
    async fn find_one(
        &self,
        selector: &str,
        within: Option<ElementHandle>,
    ) -> Result<Option<ElementHandle>> {
        Ok(self.find_all(selector, within).await?.into_iter().next())
    }
    /// Rendered text of an element.
    async fn text(&self, element: ElementHandle) -> Result<String>;
    /// Attribute value of an element; `None` when the attribute is absent.
    async fn attribute(&self, element: ElementHandle, name: &str) -> Result<Option<String>>;
    /// Click an element.
    async fn click(&self, element: ElementHandle) -> Result<()>;
    /// Get the current URL.
    async fn get_url(&self) -> Result<String>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}
