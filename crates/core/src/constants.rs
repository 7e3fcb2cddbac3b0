//! Shared constants.

use std::time::Duration;

/// Marker token introducing the embedded holdings block inside a script
/// element of the holdings page.
pub const DATA_MARKER: &str = "const data";

/// Holdings page scraped when the caller supplies no URL.
pub const DEFAULT_HOLDINGS_URL: &str = "https://stockanalysis.com/etf/spus/holdings/";

/// Timeout for the one-shot page fetch.
pub const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
