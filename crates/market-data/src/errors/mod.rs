//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`PriceError`]: The main error enum for all price operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while resolving prices.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method, which determines how the
/// resolver handles the error.
#[derive(Error, Debug)]
pub enum PriceError {
    /// The provider has no usable price for the symbol.
    /// This is a terminal error - retrying won't help.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider rate limited the request (HTTP 429 class).
    /// The resolver retries this with exponential backoff.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The rate-limit retry budget was exhausted for a symbol.
    /// Emitted by the resolver, never by a provider.
    #[error("Rate limit retries exhausted for {symbol} after {attempts} attempts")]
    RateLimitExceeded {
        /// The symbol that could not be resolved
        symbol: String,
        /// How many fetch attempts were made
        attempts: u32,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred: unexpected status, malformed
    /// payload, missing price field.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl PriceError {
    /// Returns the retry classification for this error.
    ///
    /// Only provider-signaled rate limiting maps to
    /// [`RetryClass::WithBackoff`]; everything else is permanent for the
    /// symbol within the run.
    ///
    /// # Examples
    ///
    /// ```
    /// use allocfolio_market_data::errors::{PriceError, RetryClass};
    ///
    /// let error = PriceError::RateLimited { provider: "FINNHUB".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = PriceError::SymbolNotFound("INVALID".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { .. } => RetryClass::WithBackoff,

            Self::SymbolNotFound(_)
            | Self::RateLimitExceeded { .. }
            | Self::Timeout { .. }
            | Self::ProviderError { .. }
            | Self::Network(_) => RetryClass::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = PriceError::RateLimited {
            provider: "FINNHUB".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_symbol_not_found_never_retries() {
        let error = PriceError::SymbolNotFound("INVALID".to_string());
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_timeout_never_retries() {
        let error = PriceError::Timeout {
            provider: "FINNHUB".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_provider_error_never_retries() {
        let error = PriceError::ProviderError {
            provider: "YAHOO_EOD".to_string(),
            message: "Internal server error".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_rate_limit_exceeded_never_retries() {
        let error = PriceError::RateLimitExceeded {
            symbol: "AAPL".to_string(),
            attempts: 3,
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_error_display() {
        let error = PriceError::SymbolNotFound("INVALID".to_string());
        assert_eq!(format!("{}", error), "Symbol not found: INVALID");

        let error = PriceError::RateLimited {
            provider: "FINNHUB".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: FINNHUB");

        let error = PriceError::RateLimitExceeded {
            symbol: "AAPL".to_string(),
            attempts: 3,
        };
        assert_eq!(
            format!("{}", error),
            "Rate limit retries exhausted for AAPL after 3 attempts"
        );

        let error = PriceError::ProviderError {
            provider: "YAHOO_EOD".to_string(),
            message: "HTTP 500 - oops".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider error: YAHOO_EOD - HTTP 500 - oops"
        );
    }
}
