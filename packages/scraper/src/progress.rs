//! Progress reporting for crawls.
//!
//! [`crate::CrawlScheduler`] reports through [`ProgressCallback`] so the
//! rendering backend (an `indicatif` bar, plain logs, nothing) is chosen by
//! the binary, not the library.

use std::sync::Arc;

/// Receives crawl progress updates.
///
/// Implementations must be `Send + Sync`: updates arrive from whichever task
/// drains the crawl.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of pages queued so far. Grows when another crawl
    /// starts on the same scheduler; completed pages are not reset.
    fn set_total(&self, total: u64);

    /// Advances by `delta` completed pages.
    fn inc(&self, delta: u64);

    /// Replaces the status message.
    fn set_message(&self, msg: String);

    /// Marks the crawl finished.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Shared [`NullProgress`] for callers that do not render progress.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
