//! Extraction of the embedded holdings block from page markup.
//!
//! The holdings page carries its data inside a script element, as a
//! JavaScript array of object literals assigned to a `const data`
//! variable. Extraction is a three-step recovery: locate the script by
//! marker token, cut out the array literal, normalize and parse it.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::constants::{DATA_MARKER, PAGE_FETCH_TIMEOUT};
use crate::errors::ExtractError;

use super::holdings_model::{HoldingRecord, HoldingsTable};
use super::quasi_json::normalize_quasi_json;

lazy_static! {
    /// First array literal after the data marker, up to the nearest `];`.
    ///
    /// The non-greedy scan stops at the first closing `];`, which is
    /// enough for the page's flat array-of-objects; a `]` inside a string
    /// value is out of contract.
    static ref DATA_ARRAY: Regex =
        Regex::new(&format!(r"(?s){}\s*=\s*(\[.*?\])\s*;", DATA_MARKER))
            .expect("data array pattern is valid");
}

/// Raw record exactly as embedded in the page: short keys, string-typed
/// numerics.
#[derive(Debug, Deserialize)]
struct RawHolding {
    /// Row number. Parsed for shape validation, otherwise unused.
    #[allow(dead_code)]
    no: u32,
    /// Symbol with a leading currency marker, e.g. "$AAPL".
    s: String,
    /// Display name.
    n: String,
    /// Percentage weight with a trailing percent sign, e.g. "7.25%".
    #[serde(rename = "as")]
    weight: String,
    /// Share count with thousands separators, e.g. "169,938".
    sh: String,
}

/// Recovers a [`HoldingsTable`] from the holdings page.
pub struct HoldingsExtractor {
    client: reqwest::Client,
}

impl HoldingsExtractor {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(PAGE_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }

    /// One-shot page fetch. Transient failures surface as
    /// [`ExtractError::Fetch`] and are not retried here: a static page
    /// fetch is idempotent and cheap to retry at the caller's
    /// discretion; retry policy is reserved for the price layer.
    pub async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        debug!("fetching holdings page {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Fetch the page and extract its holdings table.
    pub async fn fetch_and_extract(&self, url: &str) -> Result<HoldingsTable, ExtractError> {
        let markup = self.fetch(url).await?;
        Self::extract(&markup)
    }

    /// Extract the holdings table from already-fetched markup.
    ///
    /// Pure function of its input; preserves the source order of the
    /// embedded records.
    pub fn extract(page_markup: &str) -> Result<HoldingsTable, ExtractError> {
        let script_text = locate_marker_script(page_markup)?;

        let array_text = DATA_ARRAY
            .captures(&script_text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
            .ok_or(ExtractError::ArrayNotFound)?;

        let json_text = normalize_quasi_json(array_text);
        let raw: Vec<RawHolding> = serde_json::from_str(&json_text)
            .map_err(|e| ExtractError::MalformedData(e.to_string()))?;

        debug!("parsed {} raw holdings records", raw.len());

        let records = raw
            .into_iter()
            .map(canonicalize)
            .collect::<Result<Vec<_>, _>>()?;

        ensure_unique_symbols(&records)?;

        Ok(HoldingsTable::new(records))
    }
}

impl Default for HoldingsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the text of the first script element containing the data marker.
fn locate_marker_script(markup: &str) -> Result<String, ExtractError> {
    let document = Html::parse_document(markup);
    let selector = Selector::parse("script").expect("static selector is valid");

    for script in document.select(&selector) {
        let text: String = script.text().collect();
        if text.contains(DATA_MARKER) {
            return Ok(text);
        }
    }

    Err(ExtractError::MarkerNotFound)
}

/// Map a raw page record onto the canonical field set.
fn canonicalize(raw: RawHolding) -> Result<HoldingRecord, ExtractError> {
    let symbol = strip_currency_prefix(&raw.s).to_uppercase();
    if symbol.is_empty() {
        return Err(ExtractError::MalformedData(format!(
            "empty symbol in record '{}'",
            raw.n
        )));
    }

    let weight: f64 = raw
        .weight
        .trim_end_matches('%')
        .parse()
        .map_err(|_| ExtractError::MalformedData(format!("bad weight '{}'", raw.weight)))?;
    if weight < 0.0 {
        return Err(ExtractError::MalformedData(format!(
            "negative weight '{}' for {}",
            raw.weight, symbol
        )));
    }

    let shares_outstanding: u64 = raw
        .sh
        .replace(',', "")
        .parse()
        .map_err(|_| ExtractError::MalformedData(format!("bad share count '{}'", raw.sh)))?;

    Ok(HoldingRecord {
        symbol,
        name: raw.n,
        weight,
        shares_outstanding,
        price: None,
    })
}

/// Strip one leading non-alphanumeric currency marker, e.g. `$AAPL`.
fn strip_currency_prefix(symbol: &str) -> &str {
    match symbol.chars().next() {
        Some(c) if !c.is_ascii_alphanumeric() => &symbol[c.len_utf8()..],
        _ => symbol,
    }
}

/// Symbols must be unique within one table.
fn ensure_unique_symbols(records: &[HoldingRecord]) -> Result<(), ExtractError> {
    let mut seen = std::collections::HashSet::new();
    for record in records {
        if !seen.insert(record.symbol.as_str()) {
            return Err(ExtractError::MalformedData(format!(
                "duplicate symbol {}",
                record.symbol
            )));
        }
    }
    Ok(())
}
