#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Polite, bounded-concurrency page fetching.
//!
//! [`FetchWorker`] performs a single GET per [`Target`] and classifies the
//! outcome as a [`FetchResult`]. [`CrawlScheduler`] drives any [`Fetcher`]
//! over a batch of targets with at most `limit` requests in flight and hands
//! results back in completion order.
//!
//! This crate knows nothing about the page contents. Callers feed the bodies
//! to whatever parser they like.

pub mod config;
pub mod crawl;
pub mod fetch;
pub mod progress;

#[cfg(test)]
mod test_server;

use std::fmt;

use async_trait::async_trait;

pub use config::CrawlConfig;
pub use crawl::{CrawlHandle, CrawlOutcome, CrawlScheduler};
pub use fetch::FetchWorker;

/// Errors that can occur while fetching pages.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The request failed in transport (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status other than 404.
    #[error("HTTP {status} from {url}")]
    Status {
        /// The requested URL.
        url: String,
        /// The status code returned.
        status: u16,
    },

    /// The task fetching this target panicked or exited without reporting.
    #[error("fetch task exited before reporting a result")]
    WorkerLost,

    /// The crawl configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// One page to fetch, identified by its absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target(String);

impl Target {
    /// Wraps an absolute URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Target {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl From<&str> for Target {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

/// Outcome of fetching one [`Target`].
#[derive(Debug)]
pub enum FetchResult {
    /// The page body, as text.
    Body(String),
    /// The server answered 404. Expected for stale profile links.
    Absent,
    /// The fetch failed and produced no page.
    Failure(ScrapeError),
}

impl FetchResult {
    /// Returns the body if the fetch succeeded.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Body(body) => Some(body),
            Self::Absent | Self::Failure(_) => None,
        }
    }

    /// Whether the page was reported missing.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Whether the fetch failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Something that can turn a [`Target`] into a [`FetchResult`].
///
/// [`CrawlScheduler`] only depends on this trait, so tests and callers can
/// swap in their own fetchers.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches one target. Never fails outright; failures are reported as
    /// [`FetchResult::Failure`].
    async fn fetch(&self, target: &Target) -> FetchResult;
}
