//! Process-lifetime price cache.
//!
//! One cache instance lives for one allocation run, owned by the caller
//! that constructs the resolver, and is dropped at run end. There is no
//! eviction and no persistence: the population is bounded by the number of
//! distinct symbols in a single run, at most a few hundred.

use std::collections::HashMap;

/// In-memory symbol -> price map with case-insensitive keys.
///
/// Entries are write-once: the first stored price for a symbol wins, and
/// later resolutions of the same symbol are served from the cache without
/// another network call.
#[derive(Debug, Default)]
pub struct PriceCache {
    entries: HashMap<String, f64>,
}

impl PriceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached price. The key is normalized to uppercase.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.entries.get(&symbol.to_uppercase()).copied()
    }

    /// Store a price. The first write for a symbol wins.
    pub fn put(&mut self, symbol: &str, price: f64) {
        self.entries.entry(symbol.to_uppercase()).or_insert(price);
    }

    /// Number of cached symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_put_roundtrip() {
        let mut cache = PriceCache::new();
        assert!(cache.is_empty());

        cache.put("AAPL", 150.25);
        assert_eq!(cache.get("AAPL"), Some(150.25));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut cache = PriceCache::new();
        cache.put("aapl", 150.25);

        assert_eq!(cache.get("AAPL"), Some(150.25));
        assert_eq!(cache.get("aApL"), Some(150.25));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_write_wins() {
        let mut cache = PriceCache::new();
        cache.put("MSFT", 400.0);
        cache.put("MSFT", 401.0);

        assert_eq!(cache.get("MSFT"), Some(400.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_symbol() {
        let cache = PriceCache::new();
        assert_eq!(cache.get("NVDA"), None);
    }
}
