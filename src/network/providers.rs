//! Network provider setup

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::{
    config::Config,
    network::retry::{retry_with_backoff, RetryConfig},
    ConcreteProvider,
};

/// Build the HTTP provider and verify the endpoint answers before handing it
/// to the pipeline. The core components receive this ready client; they never
/// manage the connection themselves.
pub async fn setup_provider(config: &Config) -> Result<Arc<ConcreteProvider>> {
    let provider: Arc<ConcreteProvider> = Arc::new(
        ProviderBuilder::new()
            .on_http(config.rpc_url.parse().context("invalid POLYGON_RPC_URL")?)
            .boxed(),
    );

    let block = retry_with_backoff(
        || async {
            provider
                .get_block_number()
                .await
                .context("Failed to get block number")
        },
        &RetryConfig {
            max_attempts: 5,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
        },
        "Polygon RPC connection",
    )
    .await
    .map_err(|e| anyhow::anyhow!("Network connection failed: {}", e))?;

    info!("🔗 Connected to Polygon at block {}", block);
    Ok(provider)
}
