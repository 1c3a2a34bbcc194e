//! Bounded-concurrency crawl scheduling.
//!
//! A crawl spawns up to `limit` worker tasks. Each worker claims the next
//! target index from a shared atomic cursor, waits for a permit from the
//! scheduler's [`Semaphore`], fetches, and pushes the outcome into a
//! completion channel. [`CrawlHandle`] drains that channel, so outcomes
//! arrive in completion order rather than submission order.
//!
//! Each fetch runs in its own task, so a fetch that panics costs only its own
//! target; the worker reports it as [`ScrapeError::WorkerLost`] and moves on.
//!
//! The semaphore belongs to the scheduler, not the crawl: two crawls started
//! from the same scheduler share one cap. Progress is reported across all of
//! them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};

use crate::progress::{ProgressCallback, null_progress};
use crate::{CrawlConfig, FetchResult, Fetcher, ScrapeError, Target};

/// The result of one target, tagged with its submission index.
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Position of the target in the submitted list.
    pub index: usize,
    /// The target that was fetched.
    pub target: Target,
    /// What the fetch produced.
    pub result: FetchResult,
}

/// Drives a [`Fetcher`] over many targets with a global in-flight cap.
pub struct CrawlScheduler {
    fetcher: Arc<dyn Fetcher>,
    limiter: Arc<Semaphore>,
    limit: usize,
    request_delay: Option<Duration>,
    progress: Arc<dyn ProgressCallback>,
    queued: Arc<AtomicU64>,
    completed: Arc<AtomicU64>,
}

impl CrawlScheduler {
    /// Creates a scheduler allowing at most `limit` fetches in flight. A
    /// limit of zero is treated as one.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            fetcher,
            limiter: Arc::new(Semaphore::new(limit)),
            limit,
            request_delay: None,
            progress: null_progress(),
            queued: Arc::new(AtomicU64::new(0)),
            completed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a scheduler using the concurrency and delay from `config`.
    #[must_use]
    pub fn from_config(fetcher: Arc<dyn Fetcher>, config: &CrawlConfig) -> Self {
        let scheduler = Self::new(fetcher, config.concurrency);
        match config.request_delay() {
            Some(delay) => scheduler.with_request_delay(delay),
            None => scheduler,
        }
    }

    /// Makes each worker pause for `delay` after a fetch, while still
    /// holding its permit.
    #[must_use]
    pub const fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = Some(delay);
        self
    }

    /// Reports completions to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// The in-flight cap.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Starts crawling `targets` in the background.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(&self, targets: Vec<Target>) -> CrawlHandle {
        let targets: Arc<[Target]> = targets.into();
        let total = targets.len();
        let workers = self.limit.min(total);
        let cursor = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::unbounded_channel();

        log::info!(
            "Crawling {total} targets with {workers} workers (limit={})",
            self.limit
        );
        let added = u64::try_from(total).unwrap_or(u64::MAX);
        let queued = self.queued.fetch_add(added, Ordering::SeqCst) + added;
        self.progress.set_total(queued);

        for worker in 0..workers {
            let targets = Arc::clone(&targets);
            let cursor = Arc::clone(&cursor);
            let fetcher = Arc::clone(&self.fetcher);
            let limiter = Arc::clone(&self.limiter);
            let tx = tx.clone();
            let delay = self.request_delay;

            tokio::spawn(async move {
                loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(target) = targets.get(index) else {
                        break;
                    };

                    let Ok(permit) = limiter.acquire().await else {
                        log::warn!("Crawl limiter closed, worker {worker} stopping");
                        break;
                    };
                    let task = {
                        let fetcher = Arc::clone(&fetcher);
                        let target = target.clone();
                        tokio::spawn(async move { fetcher.fetch(&target).await })
                    };
                    let result = match task.await {
                        Ok(result) => result,
                        Err(e) => {
                            log::error!("Fetch of {target} did not complete: {e}");
                            FetchResult::Failure(ScrapeError::WorkerLost)
                        }
                    };
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    drop(permit);

                    let outcome = CrawlOutcome {
                        index,
                        target: target.clone(),
                        result,
                    };
                    if tx.send(outcome).is_err() {
                        log::debug!("Crawl handle dropped, worker {worker} stopping");
                        break;
                    }
                }
                log::trace!("Crawl worker {worker} finished");
            });
        }

        CrawlHandle {
            targets,
            rx,
            seen: vec![false; total],
            yielded: 0,
            progress: Arc::clone(&self.progress),
            queued: Arc::clone(&self.queued),
            completed: Arc::clone(&self.completed),
        }
    }

    /// Crawls `targets` and collects every outcome in completion order.
    pub async fn run(&self, targets: Vec<Target>) -> Vec<CrawlOutcome> {
        let mut handle = self.start(targets);
        let mut outcomes = Vec::with_capacity(handle.total());
        while let Some(outcome) = handle.next().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}

/// Receiving end of a running crawl.
///
/// Yields exactly one [`CrawlOutcome`] per submitted target, then `None`.
/// Dropping the handle stops workers after their current fetch.
pub struct CrawlHandle {
    targets: Arc<[Target]>,
    rx: mpsc::UnboundedReceiver<CrawlOutcome>,
    seen: Vec<bool>,
    yielded: usize,
    progress: Arc<dyn ProgressCallback>,
    queued: Arc<AtomicU64>,
    completed: Arc<AtomicU64>,
}

impl CrawlHandle {
    /// Waits for the next completed target.
    ///
    /// If every worker has exited while some targets never reported, those
    /// targets are yielded as [`ScrapeError::WorkerLost`] failures.
    pub async fn next(&mut self) -> Option<CrawlOutcome> {
        if self.remaining() == 0 {
            return None;
        }

        let outcome = match self.rx.recv().await {
            Some(outcome) => outcome,
            None => {
                let index = self.seen.iter().position(|seen| !seen)?;
                log::error!(
                    "No result for {} (worker lost), reporting failure",
                    self.targets[index]
                );
                CrawlOutcome {
                    index,
                    target: self.targets[index].clone(),
                    result: FetchResult::Failure(ScrapeError::WorkerLost),
                }
            }
        };

        self.seen[outcome.index] = true;
        self.yielded += 1;
        self.progress.inc(1);
        self.progress.set_message(outcome.target.to_string());
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if completed == self.queued.load(Ordering::SeqCst) {
            self.progress.finish(format!("Fetched {completed} pages"));
        }

        Some(outcome)
    }

    /// Number of submitted targets.
    #[must_use]
    pub fn total(&self) -> usize {
        self.targets.len()
    }

    /// Number of targets not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.targets.len() - self.yielded
    }
}
