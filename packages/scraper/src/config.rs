//! Crawl tuning knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ScrapeError;

/// Default number of requests allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 15;

/// Desktop browser user agent sent with every request. Some sites reject
/// obvious bot agents outright.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                                      (KHTML, like Gecko) Chrome/55.0.2883.87 Safari/537.36";

/// Default overall per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings for [`crate::FetchWorker`] and [`crate::CrawlScheduler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Maximum requests in flight.
    pub concurrency: usize,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Pause after each request before a worker releases its slot.
    pub request_delay_ms: Option<u64>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_delay_ms: None,
        }
    }
}

impl CrawlConfig {
    /// Sets the concurrency limit.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the whole-request timeout.
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the politeness delay between requests on one worker.
    #[must_use]
    pub const fn with_request_delay_ms(mut self, ms: u64) -> Self {
        self.request_delay_ms = Some(ms);
        self
    }

    /// Whole-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Politeness delay, if any.
    #[must_use]
    pub fn request_delay(&self) -> Option<Duration> {
        self.request_delay_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }

    /// Checks the values make sense together.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] if the concurrency or a timeout is
    /// zero, or the user agent is blank.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.concurrency == 0 {
            return Err(ScrapeError::Config(
                "concurrency must be at least 1".to_owned(),
            ));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(ScrapeError::Config("timeouts must be non-zero".to_owned()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ScrapeError::Config("user_agent must not be empty".to_owned()));
        }
        Ok(())
    }
}
