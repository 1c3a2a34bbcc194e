#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the player stats crawler.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use player_stats_cli_utils::IndicatifProgress;
use player_stats_ingest::config::parse_tables;
use player_stats_ingest::links::load_links;
use player_stats_ingest::sink::{JsonLinesSink, LogSink, PageSink};
use player_stats_ingest::{IngestConfig, crawl};

#[derive(Parser)]
#[command(
    name = "player_stats_ingest",
    about = "Crawl player profile pages and extract season stat tables"
)]
struct Cli {
    /// TOML config file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every profile listed in a link file
    Crawl {
        /// Header-less CSV of `index,path` rows
        links: PathBuf,
        /// Write one JSON object per page to this file instead of logging
        #[arg(long)]
        output: Option<PathBuf>,
        /// Comma-separated tables to extract (e.g. "totals,advanced" or "all")
        #[arg(long)]
        tables: Option<String>,
        /// Maximum number of requests in flight
        #[arg(long)]
        concurrency: Option<usize>,
        /// Site root that relative paths are joined onto
        #[arg(long)]
        root: Option<String>,
    },
    /// Extract tables from a saved profile page
    Parse {
        /// HTML file to read
        page: PathBuf,
        /// Comma-separated tables to extract
        #[arg(long)]
        tables: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = player_stats_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => IngestConfig::load(path)?,
        None => IngestConfig::default(),
    };

    match cli.command {
        Commands::Crawl {
            links,
            output,
            tables,
            concurrency,
            root,
        } => {
            if let Some(tables) = tables {
                config.tables = parse_tables(&tables)?;
            }
            if let Some(concurrency) = concurrency {
                config.crawl.concurrency = concurrency;
            }
            if let Some(root) = root {
                config.root_url = root;
            }

            let targets = load_links(&links, &config.root_url)?;
            let progress = IndicatifProgress::crawl_bar(&multi, "Crawling");
            let start = Instant::now();

            let mut sink: Box<dyn PageSink> = match &output {
                Some(path) => Box::new(JsonLinesSink::new(BufWriter::new(File::create(path)?))),
                None => Box::new(LogSink),
            };
            let summary = crawl(targets, &config, sink.as_mut(), progress).await?;

            log::info!(
                "Crawled {} pages in {:.1}s",
                summary.total(),
                start.elapsed().as_secs_f64()
            );
            if let Some(path) = output {
                log::info!("Results written to {}", path.display());
            }
        }
        Commands::Parse { page, tables } => {
            if let Some(tables) = tables {
                config.tables = parse_tables(&tables)?;
            }
            let body = std::fs::read_to_string(&page)?;
            let bundle = config.extractor().extract(&body, &config.tables)?;
            println!("{}", serde_json::to_string_pretty(&bundle)?);
        }
    }

    Ok(())
}
