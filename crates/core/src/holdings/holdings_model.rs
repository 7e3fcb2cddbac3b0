//! Normalized holdings table.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// One constituent security of the tracked fund.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    /// Uppercase ticker, unique within a table, currency prefix stripped.
    pub symbol: String,

    /// Display name, free text.
    pub name: String,

    /// Target percentage of total fund value.
    pub weight: f64,

    /// The fund's reported share count for this holding. Informational,
    /// not used in allocation.
    pub shares_outstanding: u64,

    /// Live price, attached after resolution. Usable only when positive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Ordered holdings, in source-page order.
///
/// Created once per run by the extractor; mutated only by exclusion
/// filtering and price attachment. The allocation engine reads it and
/// emits a separate result.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HoldingsTable {
    records: Vec<HoldingRecord>,
}

impl HoldingsTable {
    pub fn new(records: Vec<HoldingRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[HoldingRecord] {
        &self.records
    }

    /// Symbols in table order.
    pub fn symbols(&self) -> Vec<String> {
        self.records.iter().map(|r| r.symbol.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record whose symbol appears in `excluded`.
    ///
    /// Matching is case-insensitive: table symbols are uppercase by
    /// construction and exclusion entries are uppercased here.
    pub fn retain_excluding(&mut self, excluded: &HashSet<String>) {
        if excluded.is_empty() {
            return;
        }
        let excluded: HashSet<String> = excluded.iter().map(|s| s.to_uppercase()).collect();
        self.records.retain(|r| !excluded.contains(&r.symbol));
    }

    /// Attach resolved prices. Symbols absent from `prices`, or present
    /// with `None`, keep their current price field.
    pub fn attach_prices(&mut self, prices: &HashMap<String, Option<f64>>) {
        for record in &mut self.records {
            if let Some(Some(price)) = prices.get(&record.symbol) {
                record.price = Some(*price);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, weight: f64) -> HoldingRecord {
        HoldingRecord {
            symbol: symbol.to_string(),
            name: format!("{} Inc", symbol),
            weight,
            shares_outstanding: 1_000,
            price: None,
        }
    }

    #[test]
    fn test_symbols_preserve_order() {
        let table = HoldingsTable::new(vec![record("BBB", 1.0), record("AAA", 2.0)]);
        assert_eq!(table.symbols(), vec!["BBB", "AAA"]);
    }

    #[test]
    fn test_retain_excluding_is_case_insensitive() {
        let mut table = HoldingsTable::new(vec![record("AAA", 1.0), record("BBB", 2.0)]);

        let excluded: HashSet<String> = ["bbb".to_string()].into_iter().collect();
        table.retain_excluding(&excluded);

        assert_eq!(table.symbols(), vec!["AAA"]);
    }

    #[test]
    fn test_attach_prices_skips_unresolved() {
        let mut table = HoldingsTable::new(vec![record("AAA", 1.0), record("BBB", 2.0)]);

        let prices: HashMap<String, Option<f64>> = [
            ("AAA".to_string(), Some(10.0)),
            ("BBB".to_string(), None),
        ]
        .into_iter()
        .collect();
        table.attach_prices(&prices);

        assert_eq!(table.records()[0].price, Some(10.0));
        assert_eq!(table.records()[1].price, None);
    }
}
