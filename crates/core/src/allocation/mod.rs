//! Capital allocation across priced holdings.

mod allocation_engine;
mod allocation_model;

pub use allocation_engine::{renormalized_weights, AllocationEngine};
pub use allocation_model::{AllocationLine, AllocationMode, AllocationResult};
