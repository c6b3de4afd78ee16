//! Cross-venue spread detection

use alloy::primitives::U256;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::BotResult;
use crate::market::MarketSnapshot;
use crate::network::ChainClient;
use crate::types::{Opportunity, OpportunityKind, Quote, Venue};
use crate::utils::u256_to_decimal;
use crate::venues::quote_router;

/// Relative gain of a round trip that turned `notional` into `final_out`,
/// in percent. Negative when the trip loses money.
pub fn spread_pct(notional: U256, final_out: U256, decimals: u8) -> Option<Decimal> {
    let notional = u256_to_decimal(notional, decimals)?;
    let final_out = u256_to_decimal(final_out, decimals)?;
    if notional.is_zero() {
        return None;
    }
    Some((final_out - notional) / notional * Decimal::from(100))
}

/// Pick the direction with the larger positive spread, or None when both
/// round trips lose. `a_then_b` is the final output of buying on venue A and
/// selling on venue B; `b_then_a` the reverse.
pub fn choose_direction(
    venue_a: Venue,
    venue_b: Venue,
    a_then_b: U256,
    b_then_a: U256,
    notional: U256,
) -> Option<(Venue, Venue, U256)> {
    let best = if a_then_b >= b_then_a {
        (venue_a, venue_b, a_then_b)
    } else {
        (venue_b, venue_a, b_then_a)
    };
    (best.2 > notional).then_some(best)
}

/// Compare the round trip across exactly two on-chain venues: buy the volatile
/// leg with the snapshot's quote, then price selling it back on the other
/// venue. Returns the opportunity plus the buy-leg quote that sized it, for
/// the pre-submission freshness re-check.
pub async fn scan_spread(
    chain: &ChainClient,
    snapshot: &MarketSnapshot,
    venue_a: Venue,
    venue_b: Venue,
    config: &Config,
) -> BotResult<Option<(Opportunity, Quote)>> {
    let (Some(buy_a), Some(buy_b)) = (snapshot.quote_for(venue_a), snapshot.quote_for(venue_b))
    else {
        debug!("Spread scan skipped: snapshot missing a router quote");
        return Ok(None);
    };

    let token_in = snapshot.token_in;
    let token_out = snapshot.token_out;
    let notional = snapshot.notional;

    // Sell legs priced against live router state for the exact leg output
    let sell_b = quote_router(chain, venue_b, token_out, token_in, buy_a.amount_out).await?;
    let sell_a = quote_router(chain, venue_a, token_out, token_in, buy_b.amount_out).await?;

    let Some((buy_venue, sell_venue, final_out)) = choose_direction(
        venue_a,
        venue_b,
        sell_b.amount_out,
        sell_a.amount_out,
        notional,
    ) else {
        return Ok(None);
    };

    let Some(pct) = spread_pct(notional, final_out, token_in.decimals()) else {
        return Ok(None);
    };

    if pct < config.min_spread_pct {
        debug!(spread_pct = %pct, threshold = %config.min_spread_pct, "Spread below threshold");
        return Ok(None);
    }

    // token_in is a stablecoin, so the round-trip gain is already USD
    let gross_profit_usd =
        u256_to_decimal(final_out - notional, token_in.decimals()).unwrap_or_default();

    info!(
        buy_venue = %buy_venue,
        sell_venue = %sell_venue,
        spread_pct = %format!("{pct:.4}"),
        gross_usd = %format!("{gross_profit_usd:.4}"),
        "Spread opportunity detected"
    );

    let detection_quote = if buy_venue == venue_a {
        buy_a.clone()
    } else {
        buy_b.clone()
    };

    let opportunity = Opportunity::new(
        OpportunityKind::Arbitrage {
            buy_venue,
            sell_venue,
            asset_in: token_in,
            asset_out: token_out,
            notional,
        },
        gross_profit_usd,
    );

    Ok(Some((opportunity, detection_quote)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Token;
    use rust_decimal_macros::dec;

    const NOTIONAL: U256 = U256::from_limbs([1_000_000_000, 0, 0, 0]); // 1000 USDC

    #[test]
    fn picks_the_profitable_direction() {
        // Buy 0.50 WETH on QuickSwap, sell on SushiSwap at SushiSwap's
        // implied 2020.20 USDC/WETH: 1010.10 USDC back. The reverse trip
        // returns 990 USDC.
        let quick_then_sushi = U256::from(1_010_101_010u64);
        let sushi_then_quick = U256::from(990_000_000u64);

        let (buy, sell, final_out) = choose_direction(
            Venue::QuickSwap,
            Venue::SushiSwap,
            quick_then_sushi,
            sushi_then_quick,
            NOTIONAL,
        )
        .unwrap();

        assert_eq!(buy, Venue::QuickSwap);
        assert_eq!(sell, Venue::SushiSwap);

        let pct = spread_pct(NOTIONAL, final_out, Token::Usdc.decimals()).unwrap();
        assert!(pct > dec!(1.0) && pct < dec!(1.02), "spread was {pct}");
    }

    #[test]
    fn threshold_separates_accept_from_reject() {
        let final_out = U256::from(1_010_101_010u64); // +1.0101%
        let pct = spread_pct(NOTIONAL, final_out, 6).unwrap();
        assert!(pct >= dec!(1.0));
        assert!(pct < dec!(1.5));
    }

    #[test]
    fn both_directions_losing_yields_none() {
        let result = choose_direction(
            Venue::QuickSwap,
            Venue::SushiSwap,
            U256::from(999_000_000u64),
            U256::from(998_000_000u64),
            NOTIONAL,
        );
        assert!(result.is_none());
    }

    #[test]
    fn breakeven_is_not_an_opportunity() {
        let result =
            choose_direction(Venue::QuickSwap, Venue::SushiSwap, NOTIONAL, NOTIONAL, NOTIONAL);
        assert!(result.is_none());
    }
}
