//! Venue quoting: on-chain routers and the HTTP aggregator

pub mod oneinch;
pub mod prices;
pub mod router;

pub use oneinch::*;
pub use prices::*;
pub use router::*;

use alloy::primitives::U256;

use crate::errors::{BotError, BotResult};
use crate::network::ChainClient;
use crate::types::{Quote, Token, Venue};

/// Uniform quote entry point over the closed venue set.
pub async fn fetch_quote(
    chain: &ChainClient,
    aggregator: Option<&OneInchClient>,
    venue: Venue,
    token_in: Token,
    token_out: Token,
    amount_in: U256,
) -> BotResult<Quote> {
    match venue {
        Venue::QuickSwap | Venue::SushiSwap => {
            quote_router(chain, venue, token_in, token_out, amount_in).await
        }
        Venue::OneInch => match aggregator {
            Some(client) => client.quote(token_in, token_out, amount_in).await,
            None => Err(BotError::transient("1inch venue not configured")),
        },
    }
}
