//! Duplicate-season handling.
//!
//! A player traded mid-season appears once per team plus once on an
//! aggregate `TOT` row, all under the same season key. The page always lists
//! the aggregate first, so keeping the first row per season keeps the
//! season total and drops the per-team splits.

use player_stats_tables_models::{ParsedTable, Season, SeasonRecord, TableKind};

use crate::ParseError;

/// Builds a [`ParsedTable`] from raw rows, keeping the first row per season.
#[derive(Debug)]
pub struct SeasonReconciler {
    kind: TableKind,
    table: ParsedTable,
    discarded: usize,
}

impl SeasonReconciler {
    /// Starts a table of `kind` with the given columns (season column
    /// excluded).
    #[must_use]
    pub fn new(kind: TableKind, columns: Vec<String>) -> Self {
        Self {
            kind,
            table: ParsedTable::new(columns),
            discarded: 0,
        }
    }

    /// Offers one row whose first cell is the season key.
    ///
    /// Returns `Ok(true)` if the row was stored and `Ok(false)` if an earlier
    /// row already claimed its season.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedRow`] if the row has no cells or its
    /// value count differs from the column count.
    pub fn offer(&mut self, mut cells: Vec<String>) -> Result<bool, ParseError> {
        let expected = self.table.columns().len();
        if cells.is_empty() {
            return Err(ParseError::MalformedRow {
                kind: self.kind,
                season: String::new(),
                expected,
                found: 0,
            });
        }

        let season = cells.remove(0);
        let values: SeasonRecord = cells;
        if values.len() != expected {
            return Err(ParseError::MalformedRow {
                kind: self.kind,
                season,
                expected,
                found: values.len(),
            });
        }

        let stored = self.table.insert_if_absent(Season::new(season), values);
        if !stored {
            self.discarded += 1;
        }
        Ok(stored)
    }

    /// Number of rows dropped because their season was already stored.
    #[must_use]
    pub const fn discarded(&self) -> usize {
        self.discarded
    }

    /// Finishes the table.
    #[must_use]
    pub fn finish(self) -> ParsedTable {
        self.table
    }
}
