//! Profile link source.
//!
//! The link file is a header-less CSV of `index,path` rows, e.g.
//! `0,/players/a/abdulka01.html`. Paths are joined onto a root URL to form
//! crawl targets.

use std::io::Read;
use std::path::Path;

use player_stats_scraper::Target;

use crate::IngestError;

/// Site the profile paths are relative to.
pub const DEFAULT_ROOT_URL: &str = "https://www.basketball-reference.com";

/// Reads profile paths from CSV. Uses the second column when present,
/// otherwise the first. Blank entries are skipped.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if the input is not valid CSV.
pub fn read_paths<R: Read>(reader: R) -> Result<Vec<String>, IngestError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut paths = Vec::new();
    for record in csv.records() {
        let record = record?;
        let path = record.get(1).or_else(|| record.get(0)).unwrap_or_default();
        if !path.is_empty() {
            paths.push(path.to_owned());
        }
    }
    Ok(paths)
}

/// Joins each path onto `root`. Paths that are already absolute URLs are
/// kept as they are.
pub fn format_links<I, S>(root: &str, paths: I) -> Vec<Target>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let root = root.trim_end_matches('/');
    paths
        .into_iter()
        .filter_map(|path| {
            let path = path.as_ref().trim();
            if path.is_empty() {
                None
            } else if path.starts_with("http://") || path.starts_with("https://") {
                Some(Target::new(path))
            } else if path.starts_with('/') {
                Some(Target::new(format!("{root}{path}")))
            } else {
                Some(Target::new(format!("{root}/{path}")))
            }
        })
        .collect()
}

/// Loads the link file at `path` and turns it into targets under `root`.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be opened or parsed.
pub fn load_links(path: &Path, root: &str) -> Result<Vec<Target>, IngestError> {
    let file = std::fs::File::open(path)?;
    let targets = format_links(root, read_paths(file)?);
    log::info!("Loaded {} links from {}", targets.len(), path.display());
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_second_column_of_indexed_csv() {
        let csv = "0,/players/a/abdulka01.html\n1,/players/j/jamesle01.html\n";

        let paths = read_paths(csv.as_bytes()).unwrap();

        assert_eq!(
            paths,
            vec!["/players/a/abdulka01.html", "/players/j/jamesle01.html"]
        );
    }

    #[test]
    fn single_column_rows_and_blanks() {
        let csv = "/players/b/bryanko01.html\n\n2,\n3, /players/o/onealsh01.html \n";

        let paths = read_paths(csv.as_bytes()).unwrap();

        assert_eq!(
            paths,
            vec!["/players/b/bryanko01.html", "/players/o/onealsh01.html"]
        );
    }

    #[test]
    fn joins_paths_onto_root() {
        let targets = format_links(
            "https://www.basketball-reference.com/",
            ["/players/a/abdulka01.html", "players/j/jamesle01.html", "  "],
        );

        let urls: Vec<&str> = targets.iter().map(Target::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.basketball-reference.com/players/a/abdulka01.html",
                "https://www.basketball-reference.com/players/j/jamesle01.html",
            ]
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        let targets = format_links(DEFAULT_ROOT_URL, ["http://mirror.test/players/x.html"]);

        assert_eq!(targets[0].as_str(), "http://mirror.test/players/x.html");
    }
}
