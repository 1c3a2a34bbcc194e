#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Player season stats ingestion.
//!
//! Glues the crawler and the table extractor together: links are loaded
//! from a CSV ([`links`]), crawled with bounded concurrency, each body is
//! run through [`player_stats_tables::TableExtractor`], and every page's
//! outcome is handed to a [`sink::PageSink`] in completion order
//! ([`pipeline`]).

pub mod config;
pub mod links;
pub mod pipeline;
pub mod sink;

use player_stats_scraper::ScrapeError;

pub use config::IngestConfig;
pub use pipeline::{PageOutcome, PipelineSummary, crawl, run_pipeline};

/// Errors that can stop an ingestion run.
///
/// Per-page fetch and parse failures are not errors here; they travel as
/// [`PageOutcome`] values.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// I/O error (link file, output file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link file is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serializing an outcome failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The config file is not valid TOML for [`IngestConfig`].
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Building the crawler failed.
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    /// A table name on the command line is not a known kind.
    #[error("Unknown table kind '{0}'")]
    UnknownTable(String),

    /// The table selection is empty.
    #[error("No tables selected")]
    NoTables,

    /// The link file yielded no targets.
    #[error("No targets to crawl")]
    NoTargets,
}
