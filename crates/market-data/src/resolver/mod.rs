//! Serialized price resolution with caching, throttling, and bounded
//! retry.
//!
//! One resolver owns one [`PriceCache`] for one allocation run. Fetches
//! are strictly serialized so the courtesy delay and backoff sleeps are
//! respected deterministically. All sleeps block the calling task; the
//! batch runs to completion, with no cancellation path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::PriceCache;
use crate::errors::{PriceError, RetryClass};
use crate::provider::QuoteProvider;

/// Tuning for the resolution loop.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Maximum fetch attempts per symbol while rate limited.
    pub max_retries: u32,
    /// First backoff sleep; doubles on each further rate-limited attempt.
    pub base_backoff: Duration,
    /// Courtesy pause after every successful fetch.
    pub rate_limit_interval: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_secs(1),
            rate_limit_interval: Duration::from_secs(1),
        }
    }
}

/// Resolves live prices through a [`QuoteProvider`], memoizing results in
/// a process-lifetime [`PriceCache`].
pub struct PriceResolver {
    provider: Arc<dyn QuoteProvider>,
    cache: PriceCache,
    config: ResolverConfig,
}

impl PriceResolver {
    /// Create a resolver with a fresh, empty cache.
    pub fn new(provider: Arc<dyn QuoteProvider>, config: ResolverConfig) -> Self {
        Self {
            provider,
            cache: PriceCache::new(),
            config,
        }
    }

    /// The cache populated so far.
    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    /// Seed the cache with already-fetched prices, e.g. one batched
    /// end-of-day download. Non-positive prices are ignored; primed
    /// symbols resolve without a network call.
    pub fn prime<I>(&mut self, prices: I)
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        for (symbol, price) in prices {
            if price.is_finite() && price > 0.0 {
                self.cache.put(&symbol, price);
            }
        }
    }

    /// Resolve one symbol's price.
    ///
    /// Cached symbols return immediately, with no network call and no
    /// delay. Otherwise the provider is called up to
    /// `config.max_retries` times: rate-limited responses sleep an
    /// exponentially growing backoff and try again, any other failure is
    /// permanent for this symbol within the run.
    pub async fn resolve(&mut self, symbol: &str) -> Result<f64, PriceError> {
        let symbol = symbol.to_uppercase();

        if let Some(price) = self.cache.get(&symbol) {
            debug!("cache hit for {}: {}", symbol, price);
            return Ok(price);
        }

        for attempt in 1..=self.config.max_retries {
            match self.provider.fetch_quote(&symbol).await {
                Ok(quote) => {
                    if !quote.price.is_finite() || quote.price <= 0.0 {
                        return Err(PriceError::ProviderError {
                            provider: self.provider.id().to_string(),
                            message: format!("unusable price {} for {}", quote.price, symbol),
                        });
                    }

                    self.cache.put(&symbol, quote.price);

                    // Stay under the provider's call-frequency cap.
                    tokio::time::sleep(self.config.rate_limit_interval).await;

                    return Ok(quote.price);
                }
                Err(err) => match err.retry_class() {
                    RetryClass::WithBackoff if attempt < self.config.max_retries => {
                        let backoff = self.config.base_backoff * 2u32.saturating_pow(attempt - 1);
                        warn!(
                            "rate limited on {}, retrying in {:?} (attempt {})",
                            symbol, backoff, attempt
                        );
                        tokio::time::sleep(backoff).await;
                    }
                    RetryClass::WithBackoff => {
                        return Err(PriceError::RateLimitExceeded {
                            symbol,
                            attempts: self.config.max_retries,
                        });
                    }
                    RetryClass::Never => return Err(err),
                },
            }
        }

        // Only reachable with a zero retry budget.
        Err(PriceError::RateLimitExceeded {
            symbol,
            attempts: 0,
        })
    }

    /// Resolve a batch of symbols, serially, in the given order.
    ///
    /// Per-symbol failures never abort the batch: a symbol that cannot be
    /// resolved is recorded as `None` so one bad ticker does not block
    /// allocation across the remaining holdings. Keys of the returned map
    /// are uppercase.
    pub async fn resolve_all(&mut self, symbols: &[String]) -> HashMap<String, Option<f64>> {
        let mut prices = HashMap::with_capacity(symbols.len());

        for symbol in symbols {
            let key = symbol.to_uppercase();
            match self.resolve(&key).await {
                Ok(price) => {
                    prices.insert(key, Some(price));
                }
                Err(err) => {
                    warn!("leaving {} unpriced: {}", key, err);
                    prices.insert(key, None);
                }
            }
        }

        prices
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Instant;

    use async_trait::async_trait;

    use crate::models::Quote;

    /// Scripted provider: pops one pre-programmed outcome per call.
    struct StubProvider {
        script: Mutex<VecDeque<Result<f64, PriceError>>>,
        calls: AtomicU32,
    }

    impl StubProvider {
        fn new(script: Vec<Result<f64, PriceError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteProvider for StubProvider {
        fn id(&self) -> &'static str {
            "STUB"
        }

        async fn fetch_quote(&self, _symbol: &str) -> Result<Quote, PriceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("stub script exhausted");
            outcome.map(|price| Quote::new(price, "STUB"))
        }
    }

    fn rate_limited() -> PriceError {
        PriceError::RateLimited {
            provider: "STUB".to_string(),
        }
    }

    /// Config with no delays, for tests that don't measure timing.
    fn instant_config(max_retries: u32) -> ResolverConfig {
        ResolverConfig {
            max_retries,
            base_backoff: Duration::ZERO,
            rate_limit_interval: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_second_resolve_is_served_from_cache() {
        let provider = Arc::new(StubProvider::new(vec![Ok(150.25)]));
        let mut resolver = PriceResolver::new(provider.clone(), instant_config(3));

        let first = resolver.resolve("AAPL").await.unwrap();
        let second = resolver.resolve("AAPL").await.unwrap();

        assert_eq!(first, 150.25);
        assert_eq!(second, 150.25);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_lookup_is_case_insensitive() {
        let provider = Arc::new(StubProvider::new(vec![Ok(42.0)]));
        let mut resolver = PriceResolver::new(provider.clone(), instant_config(3));

        resolver.resolve("aapl").await.unwrap();
        let cached = resolver.resolve("AAPL").await.unwrap();

        assert_eq!(cached, 42.0);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_retries_then_succeeds() {
        let provider = Arc::new(StubProvider::new(vec![
            Err(rate_limited()),
            Err(rate_limited()),
            Ok(5.0),
        ]));
        let config = ResolverConfig {
            max_retries: 3,
            base_backoff: Duration::from_millis(20),
            rate_limit_interval: Duration::ZERO,
        };
        let mut resolver = PriceResolver::new(provider.clone(), config);

        let start = Instant::now();
        let price = resolver.resolve("AAPL").await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(price, 5.0);
        assert_eq!(provider.calls(), 3);
        // Two backoff sleeps: 20ms then 40ms.
        assert!(elapsed >= Duration::from_millis(60), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_rate_limit_budget_exhausted() {
        let provider = Arc::new(StubProvider::new(vec![
            Err(rate_limited()),
            Err(rate_limited()),
            Err(rate_limited()),
        ]));
        let mut resolver = PriceResolver::new(provider.clone(), instant_config(3));

        let err = resolver.resolve("AAPL").await.unwrap_err();

        assert_eq!(provider.calls(), 3);
        match err {
            PriceError::RateLimitExceeded { symbol, attempts } => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected RateLimitExceeded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let provider = Arc::new(StubProvider::new(vec![Err(PriceError::SymbolNotFound(
            "GONE".to_string(),
        ))]));
        let mut resolver = PriceResolver::new(provider.clone(), instant_config(3));

        let err = resolver.resolve("GONE").await.unwrap_err();

        assert_eq!(provider.calls(), 1);
        assert!(matches!(err, PriceError::SymbolNotFound(_)));
    }

    #[tokio::test]
    async fn test_non_positive_price_is_rejected() {
        let provider = Arc::new(StubProvider::new(vec![Ok(0.0)]));
        let mut resolver = PriceResolver::new(provider.clone(), instant_config(3));

        let err = resolver.resolve("ZERO").await.unwrap_err();

        assert!(matches!(err, PriceError::ProviderError { .. }));
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_all_records_partial_results() {
        let provider = Arc::new(StubProvider::new(vec![
            Ok(10.0),
            Err(PriceError::SymbolNotFound("BBB".to_string())),
            Ok(20.0),
        ]));
        let mut resolver = PriceResolver::new(provider.clone(), instant_config(3));

        let symbols = vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()];
        let prices = resolver.resolve_all(&symbols).await;

        assert_eq!(prices.get("AAA"), Some(&Some(10.0)));
        assert_eq!(prices.get("BBB"), Some(&None));
        assert_eq!(prices.get("CCC"), Some(&Some(20.0)));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_resolve_all_deduplicates_through_cache() {
        let provider = Arc::new(StubProvider::new(vec![Ok(10.0)]));
        let mut resolver = PriceResolver::new(provider.clone(), instant_config(3));

        let symbols = vec!["aaa".to_string(), "AAA".to_string()];
        let prices = resolver.resolve_all(&symbols).await;

        assert_eq!(prices.len(), 1);
        assert_eq!(prices.get("AAA"), Some(&Some(10.0)));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_primed_symbols_skip_the_provider() {
        let provider = Arc::new(StubProvider::new(vec![Ok(99.0)]));
        let mut resolver = PriceResolver::new(provider.clone(), instant_config(3));

        resolver.prime(vec![
            ("aapl".to_string(), 150.25),
            ("BAD".to_string(), 0.0),
        ]);

        assert_eq!(resolver.resolve("AAPL").await.unwrap(), 150.25);
        assert_eq!(provider.calls(), 0);

        // The non-positive price was not primed, so BAD goes to the
        // provider.
        assert_eq!(resolver.resolve("BAD").await.unwrap(), 99.0);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_success_applies_courtesy_delay() {
        let provider = Arc::new(StubProvider::new(vec![Ok(10.0)]));
        let config = ResolverConfig {
            max_retries: 3,
            base_backoff: Duration::ZERO,
            rate_limit_interval: Duration::from_millis(30),
        };
        let mut resolver = PriceResolver::new(provider, config);

        let start = Instant::now();
        resolver.resolve("AAPL").await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(30), "elapsed {:?}", elapsed);

        // Cached resolution skips the delay.
        let start = Instant::now();
        resolver.resolve("AAPL").await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(30));
    }
}
