//! Destinations for page outcomes.

use std::io::Write;

use player_stats_tables::TableBundle;
use serde::Serialize;

use crate::{IngestError, PageOutcome};

/// Consumes page outcomes as the crawl completes them.
pub trait PageSink {
    /// Handles one page.
    ///
    /// # Errors
    ///
    /// Returning an error stops the pipeline.
    fn accept(&mut self, outcome: &PageOutcome) -> Result<(), IngestError>;

    /// Called once after the last page.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if buffered output cannot be written.
    fn flush(&mut self) -> Result<(), IngestError> {
        Ok(())
    }
}

#[derive(Serialize)]
struct PageLine<'a> {
    url: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tables: Option<&'a TableBundle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> PageLine<'a> {
    fn from_outcome(outcome: &'a PageOutcome) -> Self {
        let url = outcome.target().as_str();
        match outcome {
            PageOutcome::Parsed { bundle, .. } => Self {
                url,
                status: "parsed",
                tables: Some(bundle),
                error: None,
            },
            PageOutcome::Absent { .. } => Self {
                url,
                status: "absent",
                tables: None,
                error: None,
            },
            PageOutcome::FetchFailed { error, .. } => Self {
                url,
                status: "fetch_failed",
                tables: None,
                error: Some(error.to_string()),
            },
            PageOutcome::ParseFailed { error, .. } => Self {
                url,
                status: "parse_failed",
                tables: None,
                error: Some(error.to_string()),
            },
        }
    }
}

/// Writes one JSON object per page.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wraps a writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PageSink for JsonLinesSink<W> {
    fn accept(&mut self, outcome: &PageOutcome) -> Result<(), IngestError> {
        serde_json::to_writer(&mut self.writer, &PageLine::from_outcome(outcome))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IngestError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Logs a one-line summary per page.
pub struct LogSink;

impl PageSink for LogSink {
    fn accept(&mut self, outcome: &PageOutcome) -> Result<(), IngestError> {
        match outcome {
            PageOutcome::Parsed { target, bundle } => {
                let counts: Vec<String> = bundle
                    .iter()
                    .map(|(kind, table)| format!("{kind}={} seasons", table.len()))
                    .collect();
                log::info!("{target}: {}", counts.join(", "));
            }
            PageOutcome::Absent { target } => log::info!("{target}: no such page"),
            PageOutcome::FetchFailed { target, error } => {
                log::warn!("{target}: fetch failed: {error}");
            }
            PageOutcome::ParseFailed { target, error } => {
                log::warn!("{target}: parse failed: {error}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use player_stats_scraper::{ScrapeError, Target};
    use player_stats_tables::{ParseError, ParsedTable, TableKind};

    use super::*;

    fn lines(outcomes: &[PageOutcome]) -> Vec<serde_json::Value> {
        let mut sink = JsonLinesSink::new(Vec::new());
        for outcome in outcomes {
            sink.accept(outcome).unwrap();
        }
        sink.flush().unwrap();
        String::from_utf8(sink.into_inner())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn writes_one_json_object_per_page() {
        let mut table = ParsedTable::new(vec!["PTS".into()]);
        table.insert_if_absent("2001-02".into(), vec!["1500".into()]);
        let mut bundle = TableBundle::new();
        bundle.insert(TableKind::Totals, table);

        let values = lines(&[
            PageOutcome::Parsed {
                target: Target::new("https://x.test/a.html"),
                bundle,
            },
            PageOutcome::Absent {
                target: Target::new("https://x.test/b.html"),
            },
            PageOutcome::FetchFailed {
                target: Target::new("https://x.test/c.html"),
                error: ScrapeError::Status {
                    url: "https://x.test/c.html".into(),
                    status: 503,
                },
            },
            PageOutcome::ParseFailed {
                target: Target::new("https://x.test/d.html"),
                error: ParseError::TableNotFound {
                    kind: TableKind::Advanced,
                },
            },
        ]);

        assert_eq!(values.len(), 4);
        assert_eq!(values[0]["status"], "parsed");
        assert_eq!(values[0]["tables"]["totals"]["rows"][0]["season"], "2001-02");
        assert_eq!(values[1]["status"], "absent");
        assert!(values[1].get("error").is_none());
        assert_eq!(values[2]["status"], "fetch_failed");
        assert!(values[2]["error"].as_str().unwrap().contains("503"));
        assert_eq!(values[3]["url"], "https://x.test/d.html");
        assert!(values[3]["error"].as_str().unwrap().contains("advanced"));
    }
}
