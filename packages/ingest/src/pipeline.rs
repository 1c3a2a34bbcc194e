//! Crawl-then-parse pipeline.
//!
//! Each completed fetch is classified into a [`PageOutcome`] as soon as it
//! arrives and handed to the sink. One bad page never stops the batch.

use std::sync::Arc;

use player_stats_scraper::progress::ProgressCallback;
use player_stats_scraper::{
    CrawlHandle, CrawlOutcome, CrawlScheduler, FetchResult, FetchWorker, ScrapeError, Target,
};
use player_stats_tables::{ParseError, TableBundle, TableExtractor, TableKind};
use serde::Serialize;

use crate::sink::PageSink;
use crate::{IngestConfig, IngestError};

/// What happened to one page.
#[derive(Debug)]
pub enum PageOutcome {
    /// Every requested table was extracted.
    Parsed {
        /// The page.
        target: Target,
        /// Extracted tables, keyed by kind.
        bundle: TableBundle,
    },
    /// The server reported the page missing.
    Absent {
        /// The page.
        target: Target,
    },
    /// The page could not be fetched.
    FetchFailed {
        /// The page.
        target: Target,
        /// Why the fetch failed.
        error: ScrapeError,
    },
    /// The page was fetched but a requested table could not be extracted.
    ParseFailed {
        /// The page.
        target: Target,
        /// Why extraction failed.
        error: ParseError,
    },
}

impl PageOutcome {
    /// The page this outcome belongs to.
    #[must_use]
    pub const fn target(&self) -> &Target {
        match self {
            Self::Parsed { target, .. }
            | Self::Absent { target }
            | Self::FetchFailed { target, .. }
            | Self::ParseFailed { target, .. } => target,
        }
    }
}

/// Turns a raw crawl outcome into a [`PageOutcome`] by running the body
/// through `extractor`.
#[must_use]
pub fn classify(
    outcome: CrawlOutcome,
    extractor: &TableExtractor,
    kinds: &[TableKind],
) -> PageOutcome {
    let target = outcome.target;
    match outcome.result {
        FetchResult::Body(body) => match extractor.extract(&body, kinds) {
            Ok(bundle) => PageOutcome::Parsed { target, bundle },
            Err(error) => PageOutcome::ParseFailed { target, error },
        },
        FetchResult::Absent => PageOutcome::Absent { target },
        FetchResult::Failure(error) => PageOutcome::FetchFailed { target, error },
    }
}

/// Per-status page counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    /// Pages with every table extracted.
    pub parsed: usize,
    /// Pages the server reported missing.
    pub absent: usize,
    /// Pages that could not be fetched.
    pub fetch_failed: usize,
    /// Pages fetched but not extractable.
    pub parse_failed: usize,
}

impl PipelineSummary {
    /// Counts one outcome.
    pub const fn record(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Parsed { .. } => self.parsed += 1,
            PageOutcome::Absent { .. } => self.absent += 1,
            PageOutcome::FetchFailed { .. } => self.fetch_failed += 1,
            PageOutcome::ParseFailed { .. } => self.parse_failed += 1,
        }
    }

    /// Total pages counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.parsed + self.absent + self.fetch_failed + self.parse_failed
    }
}

/// Drains `handle`, classifying and sinking each page in completion order.
///
/// # Errors
///
/// Returns [`IngestError`] only if the sink fails. Page-level failures are
/// counted in the summary.
pub async fn run_pipeline(
    mut handle: CrawlHandle,
    extractor: &TableExtractor,
    kinds: &[TableKind],
    sink: &mut dyn PageSink,
) -> Result<PipelineSummary, IngestError> {
    let mut summary = PipelineSummary::default();

    while let Some(outcome) = handle.next().await {
        let page = classify(outcome, extractor, kinds);
        match &page {
            PageOutcome::FetchFailed { target, error } => {
                log::warn!("Failed to fetch {target}: {error}");
            }
            PageOutcome::ParseFailed { target, error } => {
                log::warn!("Failed to parse {target}: {error}");
            }
            PageOutcome::Absent { target } => log::debug!("Not found: {target}"),
            PageOutcome::Parsed { target, bundle } => {
                log::debug!("Parsed {} tables from {target}", bundle.len());
            }
        }
        summary.record(&page);
        sink.accept(&page)?;
    }

    sink.flush()?;
    Ok(summary)
}

/// Crawls `targets` with the settings in `config` and sinks every page.
///
/// # Errors
///
/// * [`IngestError::NoTargets`] if `targets` is empty.
/// * [`IngestError::NoTables`] if `config` selects no tables.
/// * [`IngestError::Scrape`] if the HTTP client cannot be built.
/// * Any error from the sink.
pub async fn crawl(
    targets: Vec<Target>,
    config: &IngestConfig,
    sink: &mut dyn PageSink,
    progress: Arc<dyn ProgressCallback>,
) -> Result<PipelineSummary, IngestError> {
    if targets.is_empty() {
        return Err(IngestError::NoTargets);
    }
    if config.tables.is_empty() {
        return Err(IngestError::NoTables);
    }

    let fetcher = Arc::new(FetchWorker::new(&config.crawl)?);
    let scheduler = CrawlScheduler::from_config(fetcher, &config.crawl).with_progress(progress);
    log::debug!("Extracting tables: {:?}", config.tables);

    let handle = scheduler.start(targets);
    let summary = run_pipeline(handle, &config.extractor(), &config.tables, sink).await?;
    log::info!(
        "Done: {} parsed, {} absent, {} fetch failures, {} parse failures",
        summary.parsed,
        summary.absent,
        summary.fetch_failed,
        summary.parse_failed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use player_stats_scraper::Fetcher;
    use player_stats_scraper::progress::null_progress;

    use super::*;
    use crate::config::parse_ingest_toml;
    use crate::sink::JsonLinesSink;

    const PROFILE: &str = r#"<html><body><div id="all_totals"><!--
<div class="table_container" id="div_totals"><table id="totals">
<thead><tr><th>Season</th><th>Age</th><th>PTS</th></tr></thead>
<tbody>
<tr class="full_table"><th>1999-00</th><td>21</td><td>1485</td></tr>
<tr class="full_table"><th>2000-01</th><td>22</td><td>2019</td></tr>
</tbody></table></div>
--></div></body></html>"#;

    struct PagesFetcher;

    #[async_trait]
    impl Fetcher for PagesFetcher {
        async fn fetch(&self, target: &Target) -> FetchResult {
            let url = target.as_str();
            if url.contains("missing") {
                FetchResult::Absent
            } else if url.contains("broken") {
                FetchResult::Failure(ScrapeError::Status {
                    url: url.to_owned(),
                    status: 500,
                })
            } else if url.contains("bare") {
                FetchResult::Body("<html><body><p>No stats</p></body></html>".to_owned())
            } else {
                FetchResult::Body(PROFILE.to_owned())
            }
        }
    }

    fn start(urls: &[&str]) -> CrawlHandle {
        CrawlScheduler::new(Arc::new(PagesFetcher), 2)
            .start(urls.iter().map(|&url| Target::new(url)).collect())
    }

    #[test]
    fn classify_maps_each_fetch_result() {
        let extractor = TableExtractor::default();
        let kinds = [TableKind::Totals];
        let outcome = |result| CrawlOutcome {
            index: 0,
            target: Target::new("https://x.test/p.html"),
            result,
        };

        assert!(matches!(
            classify(outcome(FetchResult::Body(PROFILE.to_owned())), &extractor, &kinds),
            PageOutcome::Parsed { bundle, .. } if bundle.get(TableKind::Totals).unwrap().len() == 2
        ));
        assert!(matches!(
            classify(outcome(FetchResult::Absent), &extractor, &kinds),
            PageOutcome::Absent { .. }
        ));
        assert!(matches!(
            classify(
                outcome(FetchResult::Failure(ScrapeError::WorkerLost)),
                &extractor,
                &kinds
            ),
            PageOutcome::FetchFailed {
                error: ScrapeError::WorkerLost,
                ..
            }
        ));
        assert!(matches!(
            classify(
                outcome(FetchResult::Body(PROFILE.to_owned())),
                &extractor,
                &[TableKind::Advanced]
            ),
            PageOutcome::ParseFailed {
                error: ParseError::TableNotFound {
                    kind: TableKind::Advanced
                },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn mixed_batch_reports_every_page() {
        let handle = start(&[
            "https://x.test/players/a.html",
            "https://x.test/players/missing.html",
            "https://x.test/players/broken.html",
            "https://x.test/players/bare.html",
            "https://x.test/players/b.html",
        ]);
        let mut sink = JsonLinesSink::new(Vec::new());

        let summary = run_pipeline(
            handle,
            &TableExtractor::default(),
            &[TableKind::Totals],
            &mut sink,
        )
        .await
        .unwrap();

        assert_eq!(
            summary,
            PipelineSummary {
                parsed: 2,
                absent: 1,
                fetch_failed: 1,
                parse_failed: 1,
            }
        );
        assert_eq!(summary.total(), 5);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let mut urls: Vec<String> = output
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["url"].as_str().unwrap().to_owned()
            })
            .collect();
        urls.sort();
        assert_eq!(urls.len(), 5);
        assert_eq!(urls[0], "https://x.test/players/a.html");
    }

    #[tokio::test]
    async fn sink_errors_stop_the_pipeline() {
        struct FailingSink;

        impl PageSink for FailingSink {
            fn accept(&mut self, _outcome: &PageOutcome) -> Result<(), IngestError> {
                Err(IngestError::NoTargets)
            }
        }

        let result = run_pipeline(
            start(&["https://x.test/players/a.html"]),
            &TableExtractor::default(),
            &[TableKind::Totals],
            &mut FailingSink,
        )
        .await;

        assert!(matches!(result, Err(IngestError::NoTargets)));
    }

    #[tokio::test]
    async fn crawl_rejects_empty_target_list() {
        let mut sink = JsonLinesSink::new(Vec::new());

        let result = crawl(Vec::new(), &IngestConfig::default(), &mut sink, null_progress()).await;

        assert!(matches!(result, Err(IngestError::NoTargets)));
    }

    #[tokio::test]
    async fn crawl_rejects_empty_table_selection() {
        let config = parse_ingest_toml("tables = []").unwrap();
        let mut sink = JsonLinesSink::new(Vec::new());

        let result = crawl(
            vec![Target::new("http://127.0.0.1:9/players/a.html")],
            &config,
            &mut sink,
            null_progress(),
        )
        .await;

        assert!(matches!(result, Err(IngestError::NoTables)));
        assert!(sink.into_inner().is_empty());
    }

    #[tokio::test]
    async fn crawl_rejects_invalid_config() {
        let mut config = IngestConfig::default();
        config.crawl.concurrency = 0;
        let mut sink = JsonLinesSink::new(Vec::new());

        let result = crawl(
            vec![Target::new("http://127.0.0.1:9/players/a.html")],
            &config,
            &mut sink,
            null_progress(),
        )
        .await;

        assert!(matches!(
            result,
            Err(IngestError::Scrape(ScrapeError::Config(_)))
        ));
    }
}
