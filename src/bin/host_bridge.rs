//! Headless search host for stdin/stdout JSON communication.
//!
//! Reads `CommandEnvelope` messages as newline-delimited JSON from stdin and
//! writes one `ResponseEnvelope` per command to stdout.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.

use cf1_market::HostConfig;
use cf1_market::bridge::run_stdio_bridge;
use cf1_search::MarketSearch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("cf1-search-host starting");

    let config = HostConfig::load().map_err(|e| anyhow::anyhow!("failed to load config: {e}"))?;
    let live = config.live_providers();
    tracing::info!(
        providers = config.search.providers.len(),
        live = live.len(),
        "providers configured"
    );

    let search = MarketSearch::new(config.search)?;

    run_stdio_bridge(&search).await.map_err(|e| {
        tracing::error!(error = %e, "cf1-search-host exited with error");
        anyhow::anyhow!("cf1-search-host failed: {e}")
    })?;

    tracing::info!("cf1-search-host shut down cleanly");
    Ok(())
}
