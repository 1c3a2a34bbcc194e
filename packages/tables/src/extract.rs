//! Comment-embedded table extraction.
//!
//! The outer page is parsed once and its comments are collected in source
//! order. For each requested [`TableKind`] the comments carrying the kind's
//! marker are re-parsed with the same routine as the page itself, and the
//! last one that actually contains the table id is used.

use player_stats_tables_models::{TableBundle, TableKind};
use scraper::{ElementRef, Html, Selector};

use crate::{ParseError, SeasonReconciler, TableSpec};

/// Class carried by rows that represent a complete season.
pub const DEFAULT_ROW_CLASS: &str = "full_table";

/// Extracts season tables from profile page HTML.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    specs: Vec<TableSpec>,
    row_class: String,
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::new(TableSpec::BUILTIN.to_vec())
    }
}

impl TableExtractor {
    /// Creates an extractor using the given locators and the default
    /// full-season row class.
    #[must_use]
    pub fn new(specs: Vec<TableSpec>) -> Self {
        Self {
            specs,
            row_class: DEFAULT_ROW_CLASS.to_owned(),
        }
    }

    /// Overrides the class that marks full-season rows.
    #[must_use]
    pub fn with_row_class(mut self, class: &str) -> Self {
        class.clone_into(&mut self.row_class);
        self
    }

    /// Adds a locator, replacing any existing one for the same kind.
    #[must_use]
    pub fn with_spec(mut self, spec: TableSpec) -> Self {
        self.specs.retain(|existing| existing.kind != spec.kind);
        self.specs.push(spec);
        self
    }

    /// Returns the locator configured for `kind`.
    #[must_use]
    pub fn spec(&self, kind: TableKind) -> Option<&TableSpec> {
        self.specs.iter().find(|spec| spec.kind == kind)
    }

    /// Extracts tables from a document that may be absent (e.g. a 404).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyDocument`] for `None`, otherwise the same
    /// errors as [`TableExtractor::extract`].
    pub fn extract_document(
        &self,
        body: Option<&str>,
        kinds: &[TableKind],
    ) -> Result<TableBundle, ParseError> {
        body.map_or(Err(ParseError::EmptyDocument), |body| {
            self.extract(body, kinds)
        })
    }

    /// Extracts every requested table from `body`.
    ///
    /// Either every requested table is returned or the first failure is;
    /// there are no partial bundles.
    ///
    /// # Errors
    ///
    /// * [`ParseError::EmptyDocument`] if `body` is blank.
    /// * [`ParseError::Selector`] if the row class or a table id does not
    ///   form a valid CSS selector.
    /// * [`ParseError::UnsupportedKind`] if a kind has no locator.
    /// * [`ParseError::TableNotFound`] if no comment holds the table.
    /// * [`ParseError::MissingHeader`] if the table has no `<thead>`.
    /// * [`ParseError::MalformedRow`] if a full-season row does not line up
    ///   with the header.
    pub fn extract(&self, body: &str, kinds: &[TableKind]) -> Result<TableBundle, ParseError> {
        if body.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        let document = parse_html(body);
        let comments = comment_texts(&document);
        log::trace!("Document has {} comments", comments.len());

        let mut bundle = TableBundle::new();
        if kinds.is_empty() {
            return Ok(bundle);
        }

        let header_sel = parse_selector("thead")?;
        let header_cell_sel = parse_selector("th")?;
        let row_sel = parse_selector(&format!("tr.{}", self.row_class))?;
        let cell_sel = parse_selector("th, td")?;

        for &kind in kinds {
            let spec = self
                .spec(kind)
                .ok_or(ParseError::UnsupportedKind { kind })?;
            let table_sel = parse_selector(&format!("table#{}", spec.table_id))?;
            let fragment = select_fragment(&comments, spec, &table_sel)
                .ok_or(ParseError::TableNotFound { kind })?;
            let table = fragment
                .select(&table_sel)
                .next()
                .ok_or(ParseError::TableNotFound { kind })?;

            // ── Header ──────────────────────────────────────────────────
            let thead = table
                .select(&header_sel)
                .next()
                .ok_or(ParseError::MissingHeader { kind })?;
            let columns: Vec<String> = thead
                .select(&header_cell_sel)
                .skip(1)
                .map(cell_text)
                .collect();

            // ── Full-season rows ────────────────────────────────────────
            let mut reconciler = SeasonReconciler::new(kind, columns);
            for row in table.select(&row_sel) {
                reconciler.offer(row.select(&cell_sel).map(cell_text).collect())?;
            }

            if reconciler.discarded() > 0 {
                log::debug!(
                    "Table '{kind}': dropped {} per-team rows of traded seasons",
                    reconciler.discarded()
                );
            }
            bundle.insert(kind, reconciler.finish());
        }

        Ok(bundle)
    }
}

/// Parses a page or a comment payload.
fn parse_html(text: &str) -> Html {
    Html::parse_document(text)
}

/// Parses a CSS selector string, returning a [`ParseError`] on failure.
fn parse_selector(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector)
        .map_err(|e| ParseError::Selector(format!("invalid CSS selector '{selector}': {e}")))
}

/// Text of every comment node, in source order.
fn comment_texts(document: &Html) -> Vec<&str> {
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_comment())
        .map(|comment| &**comment)
        .collect()
}

/// Re-parses the last comment that carries the marker and contains the
/// table. Comments with the marker but no such table are skipped.
fn select_fragment(comments: &[&str], spec: &TableSpec, table_sel: &Selector) -> Option<Html> {
    let mut selected = None;
    for text in comments.iter().filter(|text| text.contains(spec.marker)) {
        let fragment = parse_html(text);
        if fragment.select(table_sel).next().is_some() {
            selected = Some(fragment);
        } else {
            log::debug!(
                "Skipping comment with marker {} but no table #{}",
                spec.marker,
                spec.table_id
            );
        }
    }
    selected
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<Vec<_>>().join("").trim().to_owned()
}
