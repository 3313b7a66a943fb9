use std::sync::Arc;

use color_eyre::{eyre::Context, Result};
use dotenv::dotenv;
use hookswap_agent::{
    agent::SwapAgent, config::AgentConfig, connection::connect, policy::NoBetterPrice,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Hookswap fulfillment agent
/// Handles:
/// - subscription to `SwapIntent` events emitted by the swap hook
/// - submission of `completeSwap` for every new intent
/// - wallet and hook balance reporting around each completion
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    // Load configuration from the environment
    let config = AgentConfig::from_env().context("Failed to load agent config")?;

    // setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(config.log_level()?)
        .init();

    info!("Setting up RPC provider");
    let connection = Arc::new(connect(&config).context("Failed to set up chain connection")?);

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                ctrl_c.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    SwapAgent::new(&config, connection, NoBetterPrice)
        .run(shutdown)
        .await
        .context("Agent stopped unexpectedly")?;

    info!("Agent shut down");
    Ok(())
}
