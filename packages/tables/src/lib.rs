#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Stat table extraction for player profile pages.
//!
//! Profile pages ship most of their stat tables inside HTML comments so that
//! they are invisible to a plain DOM walk. [`TableExtractor`] finds the
//! comment that carries each requested table, re-parses it, and normalises
//! the table into a season-keyed [`ParsedTable`] via [`SeasonReconciler`].

pub mod extract;
pub mod reconcile;
pub mod spec;

pub use extract::TableExtractor;
pub use player_stats_tables_models::{
    ParsedTable, Season, SeasonRecord, SeasonRow, TableBundle, TableKind,
};
pub use reconcile::SeasonReconciler;
pub use spec::TableSpec;

/// Errors that can occur while extracting tables from a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The document body was missing or blank.
    #[error("document is empty")]
    EmptyDocument,

    /// No comment in the document held the requested table.
    #[error("table '{kind}' not found in document")]
    TableNotFound {
        /// The table that was requested.
        kind: TableKind,
    },

    /// The table was found but has no `<thead>` to read columns from.
    #[error("table '{kind}' has no header row")]
    MissingHeader {
        /// The table that was requested.
        kind: TableKind,
    },

    /// A full-season row did not line up with the header.
    #[error(
        "malformed row in table '{kind}' for season '{season}': expected {expected} values, found {found}"
    )]
    MalformedRow {
        /// The table being parsed.
        kind: TableKind,
        /// Season key of the offending row (empty if the row had no cells).
        season: String,
        /// Number of columns after the season column.
        expected: usize,
        /// Number of values the row carried.
        found: usize,
    },

    /// A table id or row class did not form a valid CSS selector.
    #[error("Selector error: {0}")]
    Selector(String),

    /// The extractor has no locator configured for the requested kind.
    #[error("no locator configured for table '{kind}'")]
    UnsupportedKind {
        /// The table that was requested.
        kind: TableKind,
    },
}
