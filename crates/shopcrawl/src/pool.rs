// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fixed-size worker pool fed by a single producer.
//!
//! A bounded channel carries tasks from the producer to `workers` consumers
//! that share the receiving end. The producer and the join loop run
//! concurrently; when the producer returns, its sender is dropped and workers
//! drain the remaining tasks before exiting. Each task is received by exactly
//! one worker.
//!
//! A worker returning `Err` ends the run: the other workers are aborted, which
//! drops the last receiver so the producer's next send fails and it stops.

use crate::error::CrawlError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Producer side of the task queue.
pub struct TaskSender<T> {
    tx: mpsc::Sender<T>,
}

impl<T> TaskSender<T> {
    /// Queue a task, waiting for capacity. Returns `false` once no worker is
    /// left to receive it.
    pub async fn send(&self, task: T) -> bool {
        self.tx.send(task).await.is_ok()
    }
}

/// Consumer side of the task queue, shared by every worker.
pub struct TaskQueue<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for TaskQueue<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

impl<T> TaskQueue<T> {
    /// Next task, or `None` once the producer is done and the queue is drained.
    pub async fn recv(&self) -> Option<T> {
        let mut guard = self.rx.lock().await;
        guard.recv().await
    }
}

/// What one worker did before exiting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Tasks received.
    pub processed: usize,
    /// Tasks dropped without writing.
    pub skipped: usize,
    /// Records written.
    pub stored: usize,
    /// The worker gave up before the queue closed.
    pub aborted: bool,
}

/// Per-worker reports (by worker index) plus the number of tasks queued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub queued: usize,
    pub workers: Vec<WorkerReport>,
}

impl PoolReport {
    pub fn processed(&self) -> usize {
        self.workers.iter().map(|w| w.processed).sum()
    }

    pub fn stored(&self) -> usize {
        self.workers.iter().map(|w| w.stored).sum()
    }

    pub fn skipped(&self) -> usize {
        self.workers.iter().map(|w| w.skipped).sum()
    }

    pub fn aborted_workers(&self) -> usize {
        self.workers.iter().filter(|w| w.aborted).count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Dispatcher {
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Run `producer` against a pool of `workers` copies of `worker`.
    ///
    /// The producer returns how many tasks it queued. Returns once every
    /// worker has exited; the first worker error (or else the producer's
    /// error) is returned.
    pub async fn run<T, P, PFut, W, WFut>(&self, producer: P, worker: W) -> Result<PoolReport, CrawlError>
    where
        T: Send + 'static,
        P: FnOnce(TaskSender<T>) -> PFut,
        PFut: Future<Output = Result<usize, CrawlError>>,
        W: Fn(usize, TaskQueue<T>) -> WFut,
        WFut: Future<Output = Result<WorkerReport, CrawlError>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let queue = TaskQueue {
            rx: Arc::new(Mutex::new(rx)),
        };

        let mut set = JoinSet::new();
        let mut ids = HashMap::new();
        for idx in 0..self.workers {
            let fut = worker(idx, queue.clone());
            let handle = set.spawn(async move { (idx, fut.await) });
            ids.insert(handle.id(), idx);
        }
        // Workers hold the only receivers from here on.
        drop(queue);

        let drain = async {
            let mut reports = vec![WorkerReport::default(); self.workers];
            let mut first_err: Option<CrawlError> = None;

            while let Some(joined) = set.join_next().await {
                let failure = match joined {
                    Ok((idx, Ok(report))) => {
                        debug!(worker = idx, processed = report.processed, "worker finished");
                        reports[idx] = report;
                        None
                    }
                    Ok((idx, Err(e))) => Some((idx, e)),
                    Err(e) if e.is_cancelled() => None,
                    Err(e) => {
                        let idx = ids.get(&e.id()).copied().unwrap_or_default();
                        Some((
                            idx,
                            CrawlError::Worker {
                                worker: idx,
                                reason: format!("worker task failed: {e}"),
                            },
                        ))
                    }
                };

                if let Some((idx, e)) = failure {
                    reports[idx].aborted = true;
                    if first_err.is_none() {
                        error!(worker = idx, error = %e, "worker failed; stopping pool");
                        set.abort_all();
                        first_err = Some(e);
                    }
                }
            }
            (reports, first_err)
        };

        let (produced, (reports, worker_err)) = tokio::join!(producer(TaskSender { tx }), drain);

        if let Some(e) = worker_err {
            return Err(e);
        }
        let queued = produced?;
        Ok(PoolReport {
            queued,
            workers: reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Worker that records every task it receives.
    fn recording_worker(
        seen: Arc<std::sync::Mutex<Vec<(usize, u32)>>>,
    ) -> impl Fn(usize, TaskQueue<u32>) -> std::pin::Pin<Box<dyn Future<Output = Result<WorkerReport, CrawlError>> + Send>>
    {
        move |idx, queue| {
            let seen = Arc::clone(&seen);
            Box::pin(async move {
                let mut report = WorkerReport::default();
                while let Some(task) = queue.recv().await {
                    report.processed += 1;
                    seen.lock().unwrap().push((idx, task));
                    tokio::task::yield_now().await;
                }
                Ok(report)
            })
        }
    }

    #[tokio::test]
    async fn test_each_task_processed_exactly_once() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let dispatcher = Dispatcher::new(2, 1);

        let report = dispatcher
            .run(
                |tx| async move {
                    let mut queued = 0;
                    for task in 1..=5u32 {
                        if tx.send(task).await {
                            queued += 1;
                        }
                    }
                    Ok::<usize, CrawlError>(queued)
                },
                recording_worker(Arc::clone(&seen)),
            )
            .await
            .unwrap();

        assert_eq!(report.queued, 5);
        assert_eq!(report.processed(), 5);
        assert_eq!(report.workers.len(), 2);

        let mut tasks: Vec<u32> = seen.lock().unwrap().iter().map(|(_, t)| *t).collect();
        tasks.sort();
        assert_eq!(tasks, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_empty_producer_lets_workers_exit() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let report = Dispatcher::new(3, 1)
            .run(|_tx| async move { Ok::<usize, CrawlError>(0) }, recording_worker(Arc::clone(&seen)))
            .await
            .unwrap();
        assert_eq!(report.queued, 0);
        assert_eq!(report.processed(), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_worker_error_stops_producer_and_run() {
        let sent = Arc::new(AtomicUsize::new(0));
        let sent_by_producer = Arc::clone(&sent);

        let result = Dispatcher::new(2, 1)
            .run(
                move |tx| async move {
                    for task in 0..10_000u32 {
                        if !tx.send(task).await {
                            break;
                        }
                        sent_by_producer.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok::<usize, CrawlError>(sent_by_producer.load(Ordering::SeqCst))
                },
                |idx, queue: TaskQueue<u32>| async move {
                    while let Some(task) = queue.recv().await {
                        if task == 3 {
                            return Err(CrawlError::Script(format!("worker {idx} broke")));
                        }
                    }
                    Ok::<WorkerReport, CrawlError>(WorkerReport::default())
                },
            )
            .await;

        assert!(matches!(result, Err(CrawlError::Script(_))));
        assert!(sent.load(Ordering::SeqCst) < 10_000);
    }

    #[tokio::test]
    async fn test_producer_error_is_returned_after_drain() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let result = Dispatcher::new(2, 1)
            .run(
                |tx| async move {
                    tx.send(1).await;
                    Err::<usize, CrawlError>(CrawlError::RootPage {
                        url: "https://shop.test/men/".into(),
                        reason: "timeout".into(),
                    })
                },
                recording_worker(Arc::clone(&seen)),
            )
            .await;
        assert!(matches!(result, Err(CrawlError::RootPage { .. })));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_aborted_workers_reported() {
        let report = Dispatcher::new(3, 1)
            .run(
                |tx| async move {
                    let mut queued = 0;
                    for task in 0..4u32 {
                        if tx.send(task).await {
                            queued += 1;
                        }
                    }
                    Ok::<usize, CrawlError>(queued)
                },
                |idx, queue: TaskQueue<u32>| async move {
                    if idx == 0 {
                        return Ok(WorkerReport {
                            aborted: true,
                            ..WorkerReport::default()
                        });
                    }
                    let mut report = WorkerReport::default();
                    while queue.recv().await.is_some() {
                        report.processed += 1;
                    }
                    Ok::<WorkerReport, CrawlError>(report)
                },
            )
            .await
            .unwrap();
        assert_eq!(report.aborted_workers(), 1);
        assert_eq!(report.processed(), 4);
        assert!(report.workers[0].aborted);
    }
}
