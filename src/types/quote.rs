//! Venue quote types

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Token, Venue};
use crate::utils::u256_to_decimal;

/// A single venue quote: `amount_in` of `token_in` buys `amount_out` of
/// `token_out`, observed at `fetched_at`. Immutable once produced; amounts
/// are integer base units, never floats.
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub venue: Venue,
    pub token_in: Token,
    pub token_out: Token,
    pub amount_in: U256,
    pub amount_out: U256,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(
        venue: Venue,
        token_in: Token,
        token_out: Token,
        amount_in: U256,
        amount_out: U256,
    ) -> Self {
        Self {
            venue,
            token_in,
            token_out,
            amount_in,
            amount_out,
            fetched_at: Utc::now(),
        }
    }

    /// Quotes older than the freshness window must not drive execution.
    pub fn is_fresh(&self, max_age_secs: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.fetched_at);
        age.num_seconds() >= 0 && (age.num_seconds() as u64) <= max_age_secs
    }

    /// Output per unit of input, in display units of the two tokens.
    pub fn effective_price(&self) -> Option<Decimal> {
        let amount_in = u256_to_decimal(self.amount_in, self.token_in.decimals())?;
        let amount_out = u256_to_decimal(self.amount_out, self.token_out.decimals())?;
        if amount_in.is_zero() {
            return None;
        }
        Some(amount_out / amount_in)
    }

    /// Relative movement of `other`'s output against this quote, in percent.
    /// Positive means the market improved, negative means it moved against us.
    pub fn drift_pct(&self, other: &Quote) -> Option<Decimal> {
        let base = u256_to_decimal(self.amount_out, self.token_out.decimals())?;
        let now = u256_to_decimal(other.amount_out, other.token_out.decimals())?;
        if base.is_zero() {
            return None;
        }
        Some((now - base) / base * Decimal::from(100))
    }
}
