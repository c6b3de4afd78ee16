//! Profit and risk gate chain

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::Config;
use crate::tracker::AttemptTracker;
use crate::types::{Decision, Opportunity, OpportunityKind, Quote, RejectReason};

/// Expected net profit after the fixed fee model. For liquidations the gross
/// is the bonus value and the flash-loan/swap fees and overhead come off; for
/// arbitrage the venue quotes already price the swap fees, so only the
/// flash-loan fee and overhead remain.
pub fn net_profit_usd(opportunity: &Opportunity, config: &Config) -> Decimal {
    let hundred = Decimal::from(100);
    let exposure = opportunity.exposure_usd();
    match opportunity.kind {
        OpportunityKind::Liquidation { .. } => {
            opportunity.gross_profit_usd
                - exposure * config.flash_loan_fee_pct / hundred
                - exposure * config.swap_fee_pct / hundred
                - config.fixed_overhead_usd
        }
        OpportunityKind::Arbitrage { .. } => {
            opportunity.gross_profit_usd
                - exposure * config.flash_loan_fee_pct / hundred
                - config.fixed_overhead_usd
        }
    }
}

/// Apply the ordered gate chain and produce a decision. Gates short-circuit
/// at the first failure, cheapest and most decisive first: profit floor,
/// slippage headroom, gas-price ceiling, daily attempt quota, spend budget.
/// The freshness re-check runs later, inside the execution engine, because
/// venue state can move between evaluation and submission.
///
/// Reads the tracker; never writes it.
pub fn evaluate(
    opportunity: Opportunity,
    gas_price_gwei: Decimal,
    tracker: &AttemptTracker,
    config: &Config,
    today: NaiveDate,
) -> Decision {
    let net = net_profit_usd(&opportunity, config);

    // 1. Profit floor
    if net < config.min_profit_usd {
        debug!(
            net = %format!("{net:.2}"),
            floor = %config.min_profit_usd,
            "Gate: profit below floor"
        );
        return Decision::reject(opportunity, RejectReason::ProfitTooLow, net);
    }

    // 2. Slippage headroom: the edge must survive the worst fill the
    //    configured tolerance still accepts
    let exposure = opportunity.exposure_usd();
    let edge_pct = if exposure.is_zero() {
        Decimal::ZERO
    } else {
        net / exposure * Decimal::from(100)
    };
    if edge_pct < config.slippage_tolerance_pct() {
        debug!(
            edge_pct = %format!("{edge_pct:.4}"),
            tolerance_pct = %config.slippage_tolerance_pct(),
            "Gate: slippage tolerance would consume the edge"
        );
        return Decision::reject(opportunity, RejectReason::SlippageExceeded, net);
    }

    // 3. Gas-price ceiling
    if gas_price_gwei > Decimal::from(config.max_gas_price_gwei) {
        debug!(
            gas_gwei = %format!("{gas_price_gwei:.2}"),
            ceiling = config.max_gas_price_gwei,
            "Gate: gas price above ceiling"
        );
        return Decision::reject(opportunity, RejectReason::GasTooHigh, net);
    }

    // 4 & 5. Attempt quota, then spend budget
    if let Err(reason) = tracker.check(config.max_daily_attempts, config.budget_usd, today) {
        debug!(reason = reason.as_str(), "Gate: tracker check failed");
        return Decision::reject(opportunity, reason, net);
    }

    Decision::accept(opportunity, net)
}

/// Freshness re-check used immediately before submission: the re-quote must
/// not have drifted beyond the configured tolerance from the quote that sized
/// the trade. Detection and submission are separated by network round-trips,
/// and a moved market means a likely revert or an unprofitable fill.
pub fn check_freshness(
    detection_quote: &Quote,
    requote: &Quote,
    tolerance_pct: Decimal,
) -> Result<(), RejectReason> {
    match detection_quote.drift_pct(requote) {
        Some(drift) if drift.abs() <= tolerance_pct => Ok(()),
        _ => Err(RejectReason::StaleQuote),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};
    use rust_decimal_macros::dec;

    use crate::types::{Token, Venue};

    fn test_config() -> Config {
        let mut config = Config::load();
        config.min_profit_usd = dec!(2.0);
        config.slippage_tolerance_bps = 30;
        config.max_gas_price_gwei = 80;
        config.max_daily_attempts = 3;
        config.budget_usd = dec!(30.0);
        config.liquidation_bonus_pct = dec!(5.0);
        config.flash_loan_fee_pct = dec!(0.09);
        config.swap_fee_pct = dec!(0.3);
        config.fixed_overhead_usd = dec!(0.50);
        config
    }

    fn today() -> NaiveDate {
        "2026-08-07".parse().unwrap()
    }

    fn liquidation_opportunity(debt_value_usd: Decimal, config: &Config) -> Opportunity {
        Opportunity::new(
            OpportunityKind::Liquidation {
                borrower: Address::repeat_byte(0x42),
                debt_asset: Token::Usdc,
                debt_amount: U256::from(1_000_000_000u64),
                collateral_asset: Token::Weth,
                debt_value_usd,
            },
            debt_value_usd * config.liquidation_bonus_pct / dec!(100),
        )
    }

    fn arbitrage_opportunity(gross_usd: Decimal) -> Opportunity {
        Opportunity::new(
            OpportunityKind::Arbitrage {
                buy_venue: Venue::QuickSwap,
                sell_venue: Venue::SushiSwap,
                asset_in: Token::Usdc,
                asset_out: Token::Weth,
                notional: U256::from(1_000_000_000u64), // 1000 USDC
            },
            gross_usd,
        )
    }

    #[test]
    fn profitable_liquidation_is_accepted() {
        // $1,000 USDC debt, HF 0.95 path: net $45.60 clears the $2 floor
        let config = test_config();
        let tracker = AttemptTracker::new(today());
        let opportunity = liquidation_opportunity(dec!(1000), &config);

        let decision = evaluate(opportunity, dec!(40), &tracker, &config, today());
        assert!(decision.accepted);
        assert_eq!(decision.reason, RejectReason::None);
        assert_eq!(decision.net_profit_usd, dec!(45.6));
    }

    #[test]
    fn thin_profit_is_rejected_first() {
        let config = test_config();
        let tracker = AttemptTracker::new(today());
        // $1 gross on $1000 notional nets below the $2 floor
        let opportunity = arbitrage_opportunity(dec!(1.0));

        let decision = evaluate(opportunity, dec!(40), &tracker, &config, today());
        assert!(!decision.accepted);
        assert_eq!(decision.reason, RejectReason::ProfitTooLow);
    }

    #[test]
    fn gate_order_profit_wins_over_gas() {
        let config = test_config();
        let tracker = AttemptTracker::new(today());
        // Fails the profit floor AND the gas ceiling: the first gate reports
        let opportunity = arbitrage_opportunity(dec!(0.5));

        let decision = evaluate(opportunity, dec!(90), &tracker, &config, today());
        assert_eq!(decision.reason, RejectReason::ProfitTooLow);
    }

    #[test]
    fn gas_ceiling_rejects_regardless_of_profit() {
        let config = test_config();
        let tracker = AttemptTracker::new(today());
        let opportunity = liquidation_opportunity(dec!(10_000), &config);

        // 90 gwei against an 80 gwei ceiling
        let decision = evaluate(opportunity, dec!(90), &tracker, &config, today());
        assert!(!decision.accepted);
        assert_eq!(decision.reason, RejectReason::GasTooHigh);
    }

    #[test]
    fn quota_rejects_even_highly_profitable() {
        let config = test_config();
        let mut tracker = AttemptTracker::new(today());
        for _ in 0..config.max_daily_attempts {
            tracker.record_attempt(today());
        }
        let opportunity = liquidation_opportunity(dec!(10_000), &config);

        let decision = evaluate(opportunity, dec!(40), &tracker, &config, today());
        assert_eq!(decision.reason, RejectReason::QuotaExceeded);
    }

    #[test]
    fn exhausted_budget_rejects() {
        let config = test_config();
        let mut tracker = AttemptTracker::new(today());
        tracker.record_gas_spend(dec!(30));
        let opportunity = liquidation_opportunity(dec!(1000), &config);

        let decision = evaluate(opportunity, dec!(40), &tracker, &config, today());
        assert_eq!(decision.reason, RejectReason::BudgetExhausted);
    }

    #[test]
    fn slippage_gate_catches_thin_edges() {
        let mut config = test_config();
        config.min_profit_usd = dec!(2.0);
        config.slippage_tolerance_bps = 100; // 1%
        let tracker = AttemptTracker::new(today());
        // $4 net on $1000 exposure = 0.4% edge, below the 1% tolerance but
        // above the $2 floor
        let opportunity = arbitrage_opportunity(dec!(5.4));

        let decision = evaluate(opportunity, dec!(40), &tracker, &config, today());
        assert_eq!(decision.reason, RejectReason::SlippageExceeded);
    }

    #[test]
    fn evaluation_never_mutates_the_tracker() {
        let config = test_config();
        let tracker = AttemptTracker::new(today());
        let opportunity = liquidation_opportunity(dec!(1000), &config);

        let _ = evaluate(opportunity, dec!(40), &tracker, &config, today());
        assert_eq!(tracker.attempts_on(today()), 0);
        assert_eq!(tracker.cumulative_gas_spend_usd(), Decimal::ZERO);
    }

    #[test]
    fn freshness_tolerates_small_drift() {
        let quote = Quote::new(
            Venue::QuickSwap,
            Token::Usdc,
            Token::Weth,
            U256::from(1_000_000_000u64),
            U256::from(500_000_000_000_000_000u64),
        );
        let mut requote = quote.clone();
        requote.amount_out = U256::from(499_000_000_000_000_000u64); // -0.2%

        assert!(check_freshness(&quote, &requote, dec!(1.0)).is_ok());
    }

    #[test]
    fn freshness_rejects_large_drift() {
        let quote = Quote::new(
            Venue::QuickSwap,
            Token::Usdc,
            Token::Weth,
            U256::from(1_000_000_000u64),
            U256::from(500_000_000_000_000_000u64),
        );
        let mut requote = quote.clone();
        requote.amount_out = U256::from(490_000_000_000_000_000u64); // -2%

        assert_eq!(
            check_freshness(&quote, &requote, dec!(1.0)),
            Err(RejectReason::StaleQuote)
        );
    }
}
