mod args;
mod exclusions;
mod report;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use allocfolio_core::{AllocationEngine, AllocationMode, HoldingsExtractor};
use allocfolio_market_data::{FinnhubProvider, PriceResolver, QuoteProvider, YahooEodProvider};

use args::{Cli, ProviderKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let excluded = exclusions::load(&cli.exclusion_list)?;

    let extractor = HoldingsExtractor::new();
    let mut table = extractor.fetch_and_extract(&cli.url).await?;
    tracing::info!("extracted {} holdings from {}", table.len(), cli.url);

    table.retain_excluding(&excluded);
    tracing::info!(
        "{} holdings remain after applying {} exclusions",
        table.len(),
        excluded.len()
    );

    let mut resolver = build_resolver(&cli, &table.symbols()).await?;
    let prices = resolver.resolve_all(&table.symbols()).await;
    let resolved = prices.values().filter(|p| p.is_some()).count();
    tracing::info!("resolved prices for {}/{} symbols", resolved, prices.len());
    table.attach_prices(&prices);

    let mode = if cli.whole_shares {
        AllocationMode::WholeShares
    } else {
        AllocationMode::Fractional
    };
    let result = AllocationEngine::allocate(&table, cli.capital, mode)?;

    report::print(&result);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

async fn build_resolver(cli: &Cli, symbols: &[String]) -> anyhow::Result<PriceResolver> {
    match cli.provider {
        ProviderKind::Finnhub => {
            let api_key = load_api_key(&cli.api_key_path)?;
            let provider: Arc<dyn QuoteProvider> = Arc::new(FinnhubProvider::new(api_key));
            Ok(PriceResolver::new(provider, cli.resolver_config()))
        }
        ProviderKind::YahooEod => {
            let provider = Arc::new(YahooEodProvider::new());
            let mut resolver =
                PriceResolver::new(provider.clone(), cli.resolver_config());

            // One batched download seeds the cache; anything Yahoo
            // omitted falls back to per-symbol fetches in resolve_all.
            match provider.fetch_closes(symbols).await {
                Ok(closes) => resolver.prime(closes),
                Err(err) => tracing::warn!("batch close download failed: {}", err),
            }

            Ok(resolver)
        }
    }
}

/// Read the Finnhub token from the key file, falling back to the
/// FINNHUB_API_KEY environment variable.
fn load_api_key(path: &Path) -> anyhow::Result<String> {
    if path.exists() {
        let key = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read API key file {}", path.display()))?;
        let key = key.trim().to_string();
        if !key.is_empty() {
            return Ok(key);
        }
    }

    std::env::var("FINNHUB_API_KEY").ok().filter(|k| !k.is_empty()).with_context(|| {
        format!(
            "no Finnhub API key: create {} or set FINNHUB_API_KEY",
            path.display()
        )
    })
}
