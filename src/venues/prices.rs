//! USD price book for value floors and gas-cost conversion

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::time::Instant;
use tracing::warn;

use crate::types::Token;
use crate::utils::u256_to_decimal;
use crate::venues::OneInchClient;

/// Static prices used when the aggregator is unreachable or unconfigured.
/// Deliberately conservative for the volatile assets.
fn fallback_price(token: Token) -> Decimal {
    match token {
        Token::Usdc | Token::Usdt | Token::Dai => dec!(1),
        Token::Wmatic => dec!(0.5),
        Token::Weth => dec!(3000),
        Token::Wbtc => dec!(40000),
    }
}

/// Per-cycle USD prices for the known token set. Stablecoins are pinned at
/// $1; volatile assets come from a live aggregator quote of one whole unit
/// into USDC, falling back to the static table per asset on failure.
#[derive(Debug, Clone)]
pub struct PriceBook {
    prices: HashMap<Token, Decimal>,
    pub fetched_at: Instant,
}

impl PriceBook {
    pub fn fallback(native_override: Option<Decimal>) -> Self {
        let mut prices: HashMap<Token, Decimal> =
            Token::ALL.into_iter().map(|t| (t, fallback_price(t))).collect();
        if let Some(native) = native_override {
            prices.insert(Token::Wmatic, native);
        }
        Self {
            prices,
            fetched_at: Instant::now(),
        }
    }

    pub async fn fetch(client: &OneInchClient, native_override: Option<Decimal>) -> Self {
        let mut book = Self::fallback(native_override);

        for token in [Token::Wmatic, Token::Weth, Token::Wbtc] {
            if token == Token::Wmatic && native_override.is_some() {
                continue;
            }
            let one_unit = U256::from(10u64).pow(U256::from(token.decimals() as u64));
            match client.quote(token, Token::Usdc, one_unit).await {
                Ok(quote) => {
                    if let Some(price) =
                        u256_to_decimal(quote.amount_out, Token::Usdc.decimals())
                    {
                        book.prices.insert(token, price);
                    }
                }
                Err(e) => {
                    warn!(
                        token = token.symbol(),
                        error = %e,
                        "Price lookup failed, keeping fallback"
                    );
                }
            }
        }

        book.fetched_at = Instant::now();
        book
    }

    pub fn price(&self, token: Token) -> Decimal {
        self.prices
            .get(&token)
            .copied()
            .unwrap_or_else(|| fallback_price(token))
    }

    /// Native gas token price used for wei -> USD conversion.
    pub fn native_price_usd(&self) -> Decimal {
        self.price(Token::Wmatic)
    }

    /// USD value of a base-unit token amount. None when the amount does not
    /// fit Decimal, which callers treat as malformed data.
    pub fn usd_value(&self, token: Token, amount: U256) -> Option<Decimal> {
        u256_to_decimal(amount, token.decimals()).map(|units| units * self.price(token))
    }

    pub fn is_stale(&self, max_age_secs: u64) -> bool {
        self.fetched_at.elapsed().as_secs() > max_age_secs
    }
}
