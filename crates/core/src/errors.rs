//! Error types for extraction and allocation.
//!
//! Extraction errors are fatal to the whole run: without a parseable
//! source there are no holdings to allocate. Per-symbol price failures
//! are absorbed upstream (see `allocfolio-market-data`) and only shrink
//! the allocatable set.

use thiserror::Error;

/// Errors raised while recovering the holdings table from page markup.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// No script element containing the data marker token was found.
    #[error("holdings marker not found in page markup")]
    MarkerNotFound,

    /// The marker was present but no array literal followed it.
    #[error("no holdings array literal after the data marker")]
    ArrayNotFound,

    /// The array text did not parse into well-formed holdings records.
    #[error("malformed holdings data: {0}")]
    MalformedData(String),

    /// The page fetch itself failed. Not retried at this layer; a static
    /// page fetch is idempotent and cheap to retry at the caller's
    /// discretion.
    #[error("failed to fetch holdings page: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// Errors raised while computing an allocation.
#[derive(Error, Debug)]
pub enum AllocationError {
    /// Every record was excluded or left without a usable price.
    #[error("no allocatable holdings: every record is missing a usable price")]
    NoAllocatableHoldings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", ExtractError::MarkerNotFound),
            "holdings marker not found in page markup"
        );
        assert_eq!(
            format!("{}", ExtractError::MalformedData("bad record".to_string())),
            "malformed holdings data: bad record"
        );
        assert_eq!(
            format!("{}", AllocationError::NoAllocatableHoldings),
            "no allocatable holdings: every record is missing a usable price"
        );
    }
}
