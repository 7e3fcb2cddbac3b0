//! Allocation result types.

use serde::Serialize;

/// Rounding mode for share counts.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum AllocationMode {
    /// Integral share counts; indivisible remainders accumulate into
    /// leftover capital.
    WholeShares,
    /// Exact fractional share counts; the entire capital is notionally
    /// allocated.
    Fractional,
}

/// Allocation for a single holding.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AllocationLine {
    pub symbol: String,

    /// Share count. Integral in whole-share mode, exact otherwise.
    pub shares: f64,

    /// Dollars spent on this line.
    pub cost: f64,
}

/// Output of one allocation run.
///
/// Derived data, recomputed from scratch on each invocation. Line order
/// matches the order of the surviving input records.
#[derive(Clone, Debug, Serialize)]
pub struct AllocationResult {
    pub mode: AllocationMode,
    pub lines: Vec<AllocationLine>,

    /// Capital not spent. In whole-share mode this is the rounding
    /// remainder; in fractional mode it is zero up to floating-point
    /// rounding, reported rather than assumed.
    pub leftover: f64,
}

impl AllocationResult {
    /// Total dollars spent across all lines.
    pub fn total_cost(&self) -> f64 {
        self.lines.iter().map(|line| line.cost).sum()
    }
}
