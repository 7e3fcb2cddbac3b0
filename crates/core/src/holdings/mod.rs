//! Holdings domain - the normalized table and its extraction from page
//! markup.

mod holdings_extractor;
mod holdings_model;
mod quasi_json;

pub use holdings_extractor::HoldingsExtractor;
pub use holdings_model::{HoldingRecord, HoldingsTable};
pub use quasi_json::normalize_quasi_json;
