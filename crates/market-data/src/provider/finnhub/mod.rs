//! Finnhub price provider implementation.
//!
//! Fetches current prices from the Finnhub /quote endpoint, authenticated
//! by an API token. Finnhub free tier is limited to 60 API calls per
//! minute; throttling is signaled with HTTP 429 (and quota exhaustion
//! with 403), both of which are surfaced as [`PriceError::RateLimited`].
//!
//! API documentation: https://finnhub.io/docs/api

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::PriceError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

/// Per-request timeout, matching the one-shot batch-job posture.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /quote endpoint
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Open price of the day
    o: Option<f64>,
    /// Timestamp (Unix)
    t: Option<i64>,
    // Note: d (change), dp (percent change), h/l/pc exist but are not used
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubProvider
// ============================================================================

/// Finnhub price provider.
///
/// Requires an API token; see the CLI for how the token is loaded from a
/// key file or the `FINNHUB_API_KEY` environment variable.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider with the given API key.
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    /// Make a GET request to the Finnhub API and return the body text.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, PriceError> {
        let url = format!("{}{}", BASE_URL, endpoint);

        let mut request = self.client.get(&url);

        // API key goes in a header rather than a query param
        request = request.header("X-Finnhub-Token", &self.api_key);

        for (key, value) in params {
            request = request.query(&[(key, value)]);
        }

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PriceError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                PriceError::Network(e)
            }
        })?;

        let status = response.status();

        // Handle rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        // Handle forbidden (API key quota exceeded)
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(PriceError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        // Handle unauthorized (invalid API key)
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PriceError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Invalid or missing API key".to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            // Try to parse a structured error message
            if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
                if let Some(error_msg) = error_resp.error {
                    return Err(PriceError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message: error_msg,
                    });
                }
            }

            return Err(PriceError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        response
            .text()
            .await
            .map_err(|e| PriceError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })
    }

    /// Fetch the current quote from the /quote endpoint.
    async fn fetch_current_quote(&self, symbol: &str) -> Result<Quote, PriceError> {
        let params = [("symbol", symbol)];
        let text = self.fetch("/quote", &params).await?;

        let raw: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| PriceError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse quote response: {}", e),
            })?;

        let response: QuoteResponse =
            serde_json::from_value(raw.clone()).map_err(|e| PriceError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Unexpected quote payload: {}", e),
            })?;

        let price = response.c.ok_or_else(|| {
            PriceError::SymbolNotFound(format!("No quote data for symbol: {}", symbol))
        })?;

        // Finnhub returns 0 for unknown symbols instead of an error
        if price == 0.0 && response.o.unwrap_or(0.0) == 0.0 {
            return Err(PriceError::SymbolNotFound(format!(
                "Symbol not found or no trading data: {}",
                symbol
            )));
        }

        let timestamp = response.t.and_then(|ts| Utc.timestamp_opt(ts, 0).single());

        Ok(Quote {
            price,
            timestamp,
            source: PROVIDER_ID.to_string(),
            raw,
        })
    }
}

// ============================================================================
// QuoteProvider Implementation
// ============================================================================

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, PriceError> {
        debug!("Fetching current quote for {} from Finnhub", symbol);
        self.fetch_current_quote(symbol).await
    }
}

// ============================================================================
// Tests
// ============================================================================
