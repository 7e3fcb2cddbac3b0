//! Renormalization and share-plan computation.

use log::debug;

use crate::errors::AllocationError;
use crate::holdings::{HoldingRecord, HoldingsTable};

use super::allocation_model::{AllocationLine, AllocationMode, AllocationResult};

/// Computes a capital allocation over a priced holdings table.
pub struct AllocationEngine;

impl AllocationEngine {
    /// Allocate `capital` across the table's priced holdings.
    ///
    /// Records without a positive price are dropped, the survivors'
    /// weights are renormalized to sum to 100, and each survivor is
    /// assigned its weight's share of the capital. Zero or negative
    /// capital passes through un-special-cased and yields zero or
    /// negative allocations; capital sanity is the caller's concern.
    pub fn allocate(
        table: &HoldingsTable,
        capital: f64,
        mode: AllocationMode,
    ) -> Result<AllocationResult, AllocationError> {
        let priced: Vec<(&HoldingRecord, f64)> = table
            .records()
            .iter()
            .filter_map(|record| {
                record
                    .price
                    .filter(|price| *price > 0.0)
                    .map(|price| (record, price))
            })
            .collect();

        let dropped = table.len() - priced.len();
        if dropped > 0 {
            debug!("dropping {} unpriced holdings before allocation", dropped);
        }

        let raw_weights: Vec<f64> = priced.iter().map(|(record, _)| record.weight).collect();
        let weights = renormalized_weights(&raw_weights)?;

        let mut lines = Vec::with_capacity(priced.len());
        let mut spent = 0.0;

        for ((record, price), weight) in priced.iter().zip(weights) {
            let target = capital * weight / 100.0;
            let (shares, cost) = match mode {
                AllocationMode::WholeShares => {
                    let shares = (target / price).floor();
                    (shares, shares * price)
                }
                AllocationMode::Fractional => (target / price, target),
            };

            spent += cost;
            lines.push(AllocationLine {
                symbol: record.symbol.clone(),
                shares,
                cost,
            });
        }

        Ok(AllocationResult {
            mode,
            lines,
            leftover: capital - spent,
        })
    }
}

/// Rescale `weights` to sum to 100.
///
/// Fails when the set is empty or sums to zero; the division is guarded
/// explicitly rather than letting a zero denominator poison the result.
pub fn renormalized_weights(weights: &[f64]) -> Result<Vec<f64>, AllocationError> {
    let total: f64 = weights.iter().sum();
    if weights.is_empty() || total <= 0.0 {
        return Err(AllocationError::NoAllocatableHoldings);
    }

    Ok(weights.iter().map(|w| w / total * 100.0).collect())
}
