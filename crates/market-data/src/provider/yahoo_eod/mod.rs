//! Yahoo end-of-day batch price provider.
//!
//! Fetches most-recent close prices from the Yahoo v7 batch quote
//! endpoint. Needs no API token. Symbols are requested in chunks of at
//! most [`MAX_BATCH_SIZE`] with a courtesy pause between chunks to stay
//! under Yahoo's informal throttling; an explicit HTTP 429 is still
//! surfaced as [`PriceError::RateLimited`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::PriceError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const PROVIDER_ID: &str = "YAHOO_EOD";

/// Maximum symbols per batch request. Small enough to avoid URL length
/// limits and throttling.
const MAX_BATCH_SIZE: usize = 50;

/// Courtesy pause between consecutive chunk requests.
const CHUNK_PAUSE: Duration = Duration::from_millis(200);

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchResponse {
    quote_response: QuoteResponseBody,
}

#[derive(Debug, Deserialize)]
struct QuoteResponseBody {
    #[serde(default)]
    result: Vec<QuoteItem>,
}

/// One symbol's entry in the batch result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteItem {
    symbol: String,
    regular_market_price: Option<f64>,
    post_market_price: Option<f64>,
    regular_market_previous_close: Option<f64>,
    regular_market_time: Option<i64>,
}

impl QuoteItem {
    /// Best available close: live price, then post-market, then the
    /// previous session's close.
    fn close(&self) -> Option<f64> {
        self.regular_market_price
            .or(self.post_market_price)
            .or(self.regular_market_previous_close)
    }
}

// ============================================================================
// YahooEodProvider
// ============================================================================

/// Yahoo end-of-day batch price provider.
pub struct YahooEodProvider {
    client: Client,
}

impl YahooEodProvider {
    /// Create a new Yahoo EOD provider.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Request one batch of symbols and return the parsed body.
    async fn fetch_batch(&self, symbols: &[&str]) -> Result<serde_json::Value, PriceError> {
        let joined = symbols.join(",");

        debug!("Yahoo EOD request: {} symbols", symbols.len());

        let response = self
            .client
            .get(BASE_URL)
            .query(&[("symbols", joined.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PriceError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    PriceError::Network(e)
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PriceError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(PriceError::Network)
    }

    /// Fetch most-recent close prices for a list of symbols.
    ///
    /// Symbols are requested in chunks; symbols Yahoo omits from the
    /// result are simply absent from the returned map. Keys are
    /// uppercase.
    pub async fn fetch_closes(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, PriceError> {
        let mut prices = HashMap::new();

        for (i, chunk) in symbols.chunks(MAX_BATCH_SIZE).enumerate() {
            if i > 0 {
                tokio::time::sleep(CHUNK_PAUSE).await;
            }

            let refs: Vec<&str> = chunk.iter().map(String::as_str).collect();
            let raw = self.fetch_batch(&refs).await?;
            let parsed: BatchResponse =
                serde_json::from_value(raw).map_err(|e| PriceError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("Failed to parse batch response: {}", e),
                })?;

            for item in parsed.quote_response.result {
                match item.close() {
                    Some(close) => {
                        prices.insert(item.symbol.to_uppercase(), close);
                    }
                    None => warn!("Yahoo EOD: no close price for {}", item.symbol),
                }
            }
        }

        Ok(prices)
    }
}

impl Default for YahooEodProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// QuoteProvider Implementation
// ============================================================================

#[async_trait]
impl QuoteProvider for YahooEodProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, PriceError> {
        debug!("Fetching EOD close for {} from Yahoo", symbol);

        let raw = self.fetch_batch(&[symbol]).await?;
        let parsed: BatchResponse =
            serde_json::from_value(raw.clone()).map_err(|e| PriceError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse batch response: {}", e),
            })?;

        let item = parsed
            .quote_response
            .result
            .into_iter()
            .find(|item| item.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| {
                PriceError::SymbolNotFound(format!("No quote data for symbol: {}", symbol))
            })?;

        let price = item.close().ok_or_else(|| {
            PriceError::SymbolNotFound(format!("No close price for symbol: {}", symbol))
        })?;

        let timestamp = item
            .regular_market_time
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single());

        Ok(Quote {
            price,
            timestamp,
            source: PROVIDER_ID.to_string(),
            raw,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH_JSON: &str = r#"{
        "quoteResponse": {
            "result": [
                {
                    "symbol": "AAPL",
                    "regularMarketPrice": 150.25,
                    "regularMarketPreviousClose": 148.75,
                    "regularMarketTime": 1704067200
                },
                {
                    "symbol": "MSFT",
                    "regularMarketPrice": null,
                    "postMarketPrice": 401.5,
                    "regularMarketPreviousClose": 399.0
                },
                {
                    "symbol": "HALT",
                    "regularMarketPrice": null
                }
            ],
            "error": null
        }
    }"#;

    #[test]
    fn test_provider_id() {
        let provider = YahooEodProvider::new();
        assert_eq!(provider.id(), "YAHOO_EOD");
    }

    #[test]
    fn test_batch_response_parsing() {
        let response: BatchResponse = serde_json::from_str(BATCH_JSON).unwrap();
        assert_eq!(response.quote_response.result.len(), 3);
        assert_eq!(response.quote_response.result[0].symbol, "AAPL");
    }

    #[test]
    fn test_close_prefers_live_price() {
        let response: BatchResponse = serde_json::from_str(BATCH_JSON).unwrap();
        let aapl = &response.quote_response.result[0];
        assert_eq!(aapl.close(), Some(150.25));
    }

    #[test]
    fn test_close_falls_back_to_post_market() {
        let response: BatchResponse = serde_json::from_str(BATCH_JSON).unwrap();
        let msft = &response.quote_response.result[1];
        assert_eq!(msft.close(), Some(401.5));
    }

    #[test]
    fn test_close_missing_everywhere() {
        let response: BatchResponse = serde_json::from_str(BATCH_JSON).unwrap();
        let halted = &response.quote_response.result[2];
        assert_eq!(halted.close(), None);
    }

    #[test]
    fn test_empty_result_parses() {
        let json = r#"{"quoteResponse": {"result": [], "error": null}}"#;
        let response: BatchResponse = serde_json::from_str(json).unwrap();
        assert!(response.quote_response.result.is_empty());
    }
}
