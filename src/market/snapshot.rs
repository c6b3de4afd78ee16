//! Market snapshot aggregation across venues

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::time::Duration;
use tracing::warn;

use crate::network::ChainClient;
use crate::types::{Quote, Token, Venue};
use crate::venues::{fetch_quote, OneInchClient};

/// Comparable quotes for one instrument: same pair, same notional, one
/// `Quote` per venue that answered in time. Venues that fail or time out are
/// dropped, leaving a partial snapshot rather than an error.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub token_in: Token,
    pub token_out: Token,
    pub notional: U256,
    pub taken_at: DateTime<Utc>,
    pub quotes: Vec<Quote>,
}

impl MarketSnapshot {
    /// Fan out one quote query per venue, joining all of them under a
    /// per-query timeout. This is a join point: the caller never proceeds
    /// with a venue still in flight.
    pub async fn collect(
        chain: &ChainClient,
        aggregator: Option<&OneInchClient>,
        venues: &[Venue],
        token_in: Token,
        token_out: Token,
        notional: U256,
        per_query_timeout: Duration,
    ) -> Self {
        let queries = venues.iter().map(|&venue| async move {
            match tokio::time::timeout(
                per_query_timeout,
                fetch_quote(chain, aggregator, venue, token_in, token_out, notional),
            )
            .await
            {
                Ok(Ok(quote)) => Some(quote),
                Ok(Err(e)) => {
                    warn!(venue = %venue, error = %e, "Venue query failed, dropping from snapshot");
                    None
                }
                Err(_) => {
                    warn!(venue = %venue, timeout_ms = per_query_timeout.as_millis() as u64,
                        "Venue query timed out, dropping from snapshot");
                    None
                }
            }
        });

        let quotes = join_all(queries).await.into_iter().flatten().collect();

        Self {
            token_in,
            token_out,
            notional,
            taken_at: Utc::now(),
            quotes,
        }
    }

    pub fn quote_for(&self, venue: Venue) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.venue == venue)
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
