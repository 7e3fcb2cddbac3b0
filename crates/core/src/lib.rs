//! Allocfolio Core - holdings extraction and capital allocation.
//!
//! This crate turns a holdings page's embedded, semi-structured data
//! block into a normalized [`HoldingsTable`] and computes a capital
//! allocation across it. Price resolution lives in the sibling
//! `allocfolio-market-data` crate; the orchestrating binary attaches
//! resolved prices to the table before allocating.

pub mod allocation;
pub mod constants;
pub mod errors;
pub mod holdings;

// Re-export common types
pub use allocation::{AllocationEngine, AllocationLine, AllocationMode, AllocationResult};
pub use errors::{AllocationError, ExtractError};
pub use holdings::{HoldingRecord, HoldingsExtractor, HoldingsTable};
