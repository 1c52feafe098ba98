// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress event types and broadcast channel for crawl telemetry.
//!
//! Workers emit `ProgressEvent`s as tasks are queued, stored or skipped. Events
//! flow through a `tokio::sync::broadcast` channel to every subscriber (the CLI
//! spinner, tests). When no subscriber exists, events are silently dropped.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A progress event emitted during a crawl run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// The run this event belongs to.
    pub run_id: String,
    /// Monotonically increasing sequence number within the run.
    pub seq: u64,
    pub event: ProgressEventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEventKind {
    PhaseStarted { phase: Phase, workers: usize },
    /// A task was handed to the worker queue.
    TaskQueued { phase: Phase, url: String },
    ProductUrlStored { worker: usize, url: String },
    ProductStored { worker: usize, url: String },
    /// A task was dropped without writing a record.
    TaskSkipped {
        phase: Phase,
        worker: usize,
        url: String,
        reason: String,
    },
    WorkerExited {
        phase: Phase,
        worker: usize,
        processed: usize,
        aborted: bool,
    },
    PhaseCompleted {
        phase: Phase,
        processed: usize,
        stored: usize,
        skipped: usize,
        elapsed_ms: u64,
    },
}

/// Crawl phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Discovery and listing pages → product URLs.
    Listing,
    /// Product pages → product records.
    Detail,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listing => write!(f, "listing"),
            Self::Detail => write!(f, "detail"),
        }
    }
}

pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;

pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(1024)
}

/// Cloneable emitter shared by the dispatcher and its workers.
///
/// Sequence numbers come from one shared counter, so they stay unique and
/// increasing across concurrent workers.
#[derive(Debug, Clone)]
pub struct Progress {
    tx: Option<ProgressSender>,
    run_id: Arc<str>,
    seq: Arc<AtomicU64>,
}

impl Progress {
    pub fn new(tx: Option<ProgressSender>, run_id: impl Into<String>) -> Self {
        Self {
            tx,
            run_id: Arc::from(run_id.into()),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// An emitter that drops everything.
    pub fn disabled() -> Self {
        Self::new(None, "")
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Emit an event, silently ignoring send errors (no receivers listening).
    pub fn emit(&self, event: ProgressEventKind) {
        if let Some(ref sender) = self.tx {
            let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = sender.send(ProgressEvent {
                run_id: self.run_id.to_string(),
                seq,
                event,
            });
        }
    }
}
