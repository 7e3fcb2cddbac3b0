//! Quote provider trait definition.

use async_trait::async_trait;

use crate::errors::PriceError;
use crate::models::Quote;

/// Trait for live price providers.
///
/// Implement this trait to add support for a new price source. The
/// resolver treats implementations uniformly: it never inspects anything
/// but the returned [`Quote`] and the [`PriceError`] classification.
///
/// Implementations must signal provider-side throttling as
/// [`PriceError::RateLimited`] - that is the one error class the resolver
/// retries.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "FINNHUB", "YAHOO_EOD".
    /// Used for logging and error attribution.
    fn id(&self) -> &'static str;

    /// Fetch the current quote for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Uppercase ticker symbol (e.g., "AAPL")
    ///
    /// # Returns
    ///
    /// The current quote on success, or a [`PriceError`] on failure.
    /// Implementations apply their own request timeout.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, PriceError>;
}
