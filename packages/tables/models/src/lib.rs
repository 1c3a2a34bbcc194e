#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Season-indexed stat table types.
//!
//! A player profile page yields one [`TableBundle`] holding a
//! [`ParsedTable`] per requested [`TableKind`]. Each table is keyed by
//! [`Season`] and keeps rows in the order their seasons were first seen.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The stat tables a profile page can provide.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TableKind {
    /// Season totals (games, minutes, points, ...).
    Totals,
    /// Advanced metrics (PER, win shares, ...).
    Advanced,
}

/// Textual season key such as `"2001-02"`.
///
/// Only compared for equality. Seasons are never ordered or parsed as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Season(String);

impl Season {
    /// Creates a season key from its text.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Season {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Per-column values of one season, with the season key removed.
pub type SeasonRecord = Vec<String>;

/// One stored row of a [`ParsedTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonRow {
    /// The row's season key.
    pub season: Season,
    /// Values aligned with [`ParsedTable::columns`].
    pub values: SeasonRecord,
}

/// A stat table normalised to one row per season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTable {
    columns: Vec<String>,
    rows: Vec<SeasonRow>,
    #[serde(skip)]
    index: HashMap<Season, usize>,
}

impl ParsedTable {
    /// Creates an empty table with the given column names (season column
    /// already removed).
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Stores `values` under `season` unless that season already has a row.
    ///
    /// Returns `true` when the row was stored and `false` when an earlier row
    /// for the same season keeps its place.
    pub fn insert_if_absent(&mut self, season: Season, values: SeasonRecord) -> bool {
        if self.index.contains_key(&season) {
            return false;
        }
        self.index.insert(season.clone(), self.rows.len());
        self.rows.push(SeasonRow { season, values });
        true
    }

    /// Column names in header order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in the order their seasons were first encountered.
    #[must_use]
    pub fn rows(&self) -> &[SeasonRow] {
        &self.rows
    }

    /// Looks up the record stored for `season`.
    #[must_use]
    pub fn get(&self, season: &str) -> Option<&SeasonRecord> {
        self.index
            .get(&Season::from(season))
            .map(|&i| &self.rows[i].values)
    }

    /// Iterates over season keys in insertion order.
    pub fn seasons(&self) -> impl Iterator<Item = &Season> {
        self.rows.iter().map(|row| &row.season)
    }

    /// Number of stored seasons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pairs each row's values with the column names, in column order.
    ///
    /// Header names are not unique (spacer columns are blank), so every
    /// column keeps its own pair.
    #[must_use]
    pub fn labelled_rows(&self) -> Vec<(&Season, Vec<(&str, &str)>)> {
        self.rows
            .iter()
            .map(|row| {
                let pairs = self
                    .columns
                    .iter()
                    .map(String::as_str)
                    .zip(row.values.iter().map(String::as_str))
                    .collect();
                (&row.season, pairs)
            })
            .collect()
    }
}

/// All tables parsed from one document, keyed by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TableBundle {
    tables: BTreeMap<TableKind, ParsedTable>,
}

impl TableBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the table for `kind`.
    pub fn insert(&mut self, kind: TableKind, table: ParsedTable) {
        self.tables.insert(kind, table);
    }

    /// Returns the table for `kind`, if it was requested and parsed.
    #[must_use]
    pub fn get(&self, kind: TableKind) -> Option<&ParsedTable> {
        self.tables.get(&kind)
    }

    /// Iterates over the tables in [`TableKind`] order.
    pub fn iter(&self) -> impl Iterator<Item = (TableKind, &ParsedTable)> {
        self.tables.iter().map(|(kind, table)| (*kind, table))
    }

    /// Number of tables in the bundle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the bundle holds no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
