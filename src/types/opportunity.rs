//! Opportunity representation shared by both detection paths

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Token, Venue};

/// A candidate trade surfaced by a detector, normalized so the evaluator and
/// the execution engine can treat both strategies uniformly.
#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    pub id: String,
    pub detected_at: DateTime<Utc>,
    pub kind: OpportunityKind,
    /// Estimated profit before the gate chain deducts the fee model.
    pub gross_profit_usd: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub enum OpportunityKind {
    Liquidation {
        borrower: Address,
        debt_asset: Token,
        debt_amount: U256,
        collateral_asset: Token,
        /// USD value of the debt leg, used for fee deductions downstream.
        debt_value_usd: Decimal,
    },
    Arbitrage {
        buy_venue: Venue,
        sell_venue: Venue,
        asset_in: Token,
        asset_out: Token,
        notional: U256,
    },
}

impl Opportunity {
    pub fn new(kind: OpportunityKind, gross_profit_usd: Decimal) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            detected_at: Utc::now(),
            kind,
            gross_profit_usd,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            OpportunityKind::Liquidation { .. } => "liquidation",
            OpportunityKind::Arbitrage { .. } => "arbitrage",
        }
    }

    /// Capital placed at risk, used to express profit as an edge percentage.
    pub fn exposure_usd(&self) -> Decimal {
        match &self.kind {
            OpportunityKind::Liquidation { debt_value_usd, .. } => *debt_value_usd,
            OpportunityKind::Arbitrage { notional, asset_in, .. } => {
                crate::utils::u256_to_decimal(*notional, asset_in.decimals())
                    .unwrap_or_default()
            }
        }
    }

    pub fn describe(&self) -> String {
        match &self.kind {
            OpportunityKind::Liquidation {
                borrower,
                debt_asset,
                collateral_asset,
                debt_value_usd,
                ..
            } => format!(
                "liquidate {borrower} ({} debt, ${debt_value_usd:.2}, seize {})",
                debt_asset.symbol(),
                collateral_asset.symbol()
            ),
            OpportunityKind::Arbitrage {
                buy_venue,
                sell_venue,
                asset_in,
                asset_out,
                ..
            } => format!(
                "{}->{} round trip, buy {} on {buy_venue}, sell on {sell_venue}",
                asset_in.symbol(),
                asset_out.symbol(),
                asset_out.symbol()
            ),
        }
    }
}
