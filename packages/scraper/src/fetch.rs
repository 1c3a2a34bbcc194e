//! Single-page HTTP fetch.
//!
//! One GET per target, no retry. A 404 is an expected outcome for stale
//! profile links and comes back as [`FetchResult::Absent`]. Everything else
//! that is not a 2xx becomes [`FetchResult::Failure`].

use async_trait::async_trait;

use crate::{CrawlConfig, FetchResult, Fetcher, ScrapeError, Target};

/// Builds the shared [`reqwest::Client`] used by every fetch.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the configuration is invalid or the client
/// cannot be constructed.
pub fn build_client(config: &CrawlConfig) -> Result<reqwest::Client, ScrapeError> {
    config.validate()?;
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .build()
        .map_err(ScrapeError::Http)
}

/// Fetches `target` with `client` and classifies the response.
pub async fn fetch(client: &reqwest::Client, target: &Target) -> FetchResult {
    log::info!("Fetching: {target}");

    let response = match client.get(target.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Request to {target} failed: {e}");
            return FetchResult::Failure(ScrapeError::Http(e));
        }
    };

    let status = response.status();
    log::info!(
        "Starting: {target} @ {} (HTTP {})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        status.as_u16()
    );

    if status == reqwest::StatusCode::NOT_FOUND {
        log::info!("The page {target} does not exist");
        return FetchResult::Absent;
    }

    if !status.is_success() {
        log::warn!("Unexpected HTTP {status} from {target}");
        return FetchResult::Failure(ScrapeError::Status {
            url: target.to_string(),
            status: status.as_u16(),
        });
    }

    match response.text().await {
        Ok(body) => {
            log::debug!("Read {} bytes from {target}", body.len());
            FetchResult::Body(body)
        }
        Err(e) => {
            log::warn!("Reading body of {target} failed: {e}");
            FetchResult::Failure(ScrapeError::Http(e))
        }
    }
}

/// HTTP [`Fetcher`] backed by one shared connection pool.
#[derive(Debug, Clone)]
pub struct FetchWorker {
    client: reqwest::Client,
}

impl FetchWorker {
    /// Creates a worker with a client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the client cannot be built.
    pub fn new(config: &CrawlConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl Fetcher for FetchWorker {
    async fn fetch(&self, target: &Target) -> FetchResult {
        fetch(&self.client, target).await
    }
}
