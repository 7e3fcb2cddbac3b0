//! Command-line argument surface.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use allocfolio_core::constants::DEFAULT_HOLDINGS_URL;
use allocfolio_market_data::ResolverConfig;

/// Allocate capital across an ETF's holdings at live prices.
#[derive(Debug, Parser)]
#[command(name = "allocfolio", version, about)]
pub struct Cli {
    /// Total dollars to invest.
    #[arg(long, default_value_t = 100_000.0)]
    pub capital: f64,

    /// Allocate in whole shares only.
    #[arg(long)]
    pub whole_shares: bool,

    /// CSV of symbols to exclude; must have a Symbol column.
    #[arg(long, default_value = "exclusion_list.csv")]
    pub exclusion_list: PathBuf,

    /// Path to the Finnhub API key file. Falls back to the
    /// FINNHUB_API_KEY environment variable.
    #[arg(long, default_value = "finnhub_key.txt")]
    pub api_key_path: PathBuf,

    /// Price provider to use.
    #[arg(long, value_enum, default_value = "finnhub")]
    pub provider: ProviderKind,

    /// Holdings page to scrape.
    #[arg(long, default_value = DEFAULT_HOLDINGS_URL)]
    pub url: String,

    /// Maximum price-fetch attempts per symbol while rate limited.
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    /// First backoff sleep in seconds; doubles per rate-limited attempt.
    #[arg(long, default_value_t = 1.0)]
    pub base_backoff_secs: f64,

    /// Courtesy pause between successful price calls, in seconds.
    #[arg(long, default_value_t = 1.0)]
    pub rate_limit_interval_secs: f64,
}

impl Cli {
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            max_retries: self.max_retries,
            base_backoff: Duration::from_secs_f64(self.base_backoff_secs),
            rate_limit_interval: Duration::from_secs_f64(self.rate_limit_interval_secs),
        }
    }
}

/// Selectable price providers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProviderKind {
    /// REST quote endpoint, needs an API token.
    Finnhub,
    /// Batched end-of-day download, no token needed.
    YahooEod,
}
