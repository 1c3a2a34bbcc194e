//! Ingestion configuration, loaded from TOML.

use std::path::Path;
use std::str::FromStr as _;

use player_stats_scraper::CrawlConfig;
use player_stats_tables::extract::DEFAULT_ROW_CLASS;
use player_stats_tables::{TableExtractor, TableKind};
use serde::Deserialize;
use strum::IntoEnumIterator as _;

use crate::IngestError;
use crate::links::DEFAULT_ROOT_URL;

/// Everything an ingestion run needs besides the link list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Prefix joined with each relative path from the link file.
    pub root_url: String,
    /// Tables to extract from each page.
    pub tables: Vec<TableKind>,
    /// Class marking full-season rows.
    pub row_class: String,
    /// Fetch and scheduling settings.
    pub crawl: CrawlConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_owned(),
            tables: vec![TableKind::Totals],
            row_class: DEFAULT_ROW_CLASS.to_owned(),
            crawl: CrawlConfig::default(),
        }
    }
}

impl IngestConfig {
    /// Reads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, IngestError> {
        let text = std::fs::read_to_string(path)?;
        let config = parse_ingest_toml(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Builds the extractor described by this config.
    #[must_use]
    pub fn extractor(&self) -> TableExtractor {
        TableExtractor::default().with_row_class(&self.row_class)
    }
}

/// Parses an [`IngestConfig`] from TOML text.
///
/// # Errors
///
/// Returns [`IngestError::Config`] on invalid TOML or unknown table kinds.
pub fn parse_ingest_toml(toml_str: &str) -> Result<IngestConfig, IngestError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Parses a comma-separated table list such as `"totals,advanced"`.
/// `"all"` selects every kind.
///
/// # Errors
///
/// * [`IngestError::UnknownTable`] for an unrecognised name.
/// * [`IngestError::NoTables`] if the list names no table at all.
pub fn parse_tables(list: &str) -> Result<Vec<TableKind>, IngestError> {
    let mut kinds = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if name.eq_ignore_ascii_case("all") {
            return Ok(TableKind::iter().collect());
        }
        let kind = TableKind::from_str(&name.to_ascii_lowercase())
            .map_err(|_| IngestError::UnknownTable(name.to_owned()))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        return Err(IngestError::NoTables);
    }
    Ok(kinds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_TOML: &str = include_str!("../config/example.toml");

    #[test]
    fn parses_example_config() {
        let config = parse_ingest_toml(EXAMPLE_TOML).unwrap();

        assert_eq!(config.root_url, DEFAULT_ROOT_URL);
        assert_eq!(config.tables, vec![TableKind::Totals, TableKind::Advanced]);
        assert_eq!(config.crawl.concurrency, 15);
        assert_eq!(config.crawl.request_delay_ms, Some(250));
        assert!(config.crawl.validate().is_ok());
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(parse_ingest_toml("").unwrap(), IngestConfig::default());
    }

    #[test]
    fn nested_crawl_table_overrides_only_given_keys() {
        let config = parse_ingest_toml("[crawl]\nconcurrency = 3\n").unwrap();

        assert_eq!(config.crawl.concurrency, 3);
        assert_eq!(config.crawl.timeout_secs, CrawlConfig::default().timeout_secs);
        assert_eq!(config.tables, vec![TableKind::Totals]);
    }

    #[test]
    fn unknown_table_in_toml_is_rejected() {
        assert!(matches!(
            parse_ingest_toml("tables = [\"per_game\"]"),
            Err(IngestError::Config(_))
        ));
    }

    #[test]
    fn parses_table_lists() {
        assert_eq!(
            parse_tables("totals, Advanced,totals").unwrap(),
            vec![TableKind::Totals, TableKind::Advanced]
        );
        assert_eq!(parse_tables("all").unwrap().len(), 2);
        assert!(matches!(
            parse_tables("totals,shooting"),
            Err(IngestError::UnknownTable(name)) if name == "shooting"
        ));
    }

    #[test]
    fn empty_table_list_is_rejected() {
        for list in ["", ",", " , "] {
            assert!(matches!(parse_tables(list), Err(IngestError::NoTables)));
        }
    }
}
