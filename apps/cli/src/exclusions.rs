//! Exclusion-list loading.
//!
//! The exclusion list is a CSV with a `Symbol` header column, matching
//! the file format the allocator has always consumed. Symbols are
//! uppercased on load so matching against the holdings table is
//! case-insensitive.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context};

/// Load the set of excluded symbols. A missing file is fatal.
pub fn load(path: &Path) -> anyhow::Result<HashSet<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open exclusion list {}", path.display()))?;

    let headers = reader.headers().context("exclusion list has no header row")?;
    let symbol_column = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("symbol"));
    let Some(symbol_column) = symbol_column else {
        bail!(
            "exclusion list {} has no Symbol column",
            path.display()
        );
    };

    let mut excluded = HashSet::new();
    for record in reader.records() {
        let record = record.context("failed to read exclusion list row")?;
        if let Some(symbol) = record.get(symbol_column) {
            let symbol = symbol.trim();
            if !symbol.is_empty() {
                excluded.insert(symbol.to_uppercase());
            }
        }
    }

    Ok(excluded)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_uppercases_symbols() {
        let file = write_csv("Symbol,Reason\naapl,foo\nMsFt,bar\n");
        let excluded = load(file.path()).unwrap();

        assert_eq!(excluded.len(), 2);
        assert!(excluded.contains("AAPL"));
        assert!(excluded.contains("MSFT"));
    }

    #[test]
    fn test_header_match_is_case_insensitive() {
        let file = write_csv("symbol\nAAPL\n");
        let excluded = load(file.path()).unwrap();
        assert!(excluded.contains("AAPL"));
    }

    #[test]
    fn test_empty_rows_are_skipped() {
        let file = write_csv("Symbol\nAAPL\n\n  \n");
        let excluded = load(file.path()).unwrap();
        assert_eq!(excluded.len(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load(Path::new("/nonexistent/exclusions.csv")).is_err());
    }

    #[test]
    fn test_missing_symbol_column_is_an_error() {
        let file = write_csv("Ticker\nAAPL\n");
        assert!(load(file.path()).is_err());
    }
}
