//! Final report formatting.
//!
//! Output shape is a stable contract for the humans (and shell pipes)
//! consuming it; everything diagnostic goes through tracing instead.

use allocfolio_core::{AllocationMode, AllocationResult};

/// Print the allocation to stdout.
pub fn print(result: &AllocationResult) {
    match result.mode {
        AllocationMode::WholeShares => {
            for line in &result.lines {
                println!("{}  #shares: {}", line.symbol, line.shares as u64);
            }
        }
        AllocationMode::Fractional => {
            for line in &result.lines {
                println!(
                    "{}  invest ${:.2} -> {:.6} shares",
                    line.symbol, line.cost, line.shares
                );
            }
        }
    }
    println!("Capital left over: ${:.2}", result.leftover);
}
