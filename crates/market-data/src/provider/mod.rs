//! Quote provider implementations.
//!
//! Providers are pluggable through the [`QuoteProvider`] trait. The
//! resolution algorithm is provider-agnostic; only the detection of
//! rate limiting differs per provider (HTTP status vs. payload shape),
//! and that detection lives inside each implementation.

pub mod finnhub;
pub mod yahoo_eod;

mod traits;

pub use traits::QuoteProvider;
