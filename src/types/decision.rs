//! Evaluation decisions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::Opportunity;

/// Why an opportunity was rejected. `None` accompanies accepted decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    ProfitTooLow,
    SlippageExceeded,
    GasTooHigh,
    QuotaExceeded,
    BudgetExhausted,
    StaleQuote,
    SimulationFailed,
    None,
}

impl RejectReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RejectReason::ProfitTooLow => "profit_too_low",
            RejectReason::SlippageExceeded => "slippage_exceeded",
            RejectReason::GasTooHigh => "gas_too_high",
            RejectReason::QuotaExceeded => "quota_exceeded",
            RejectReason::BudgetExhausted => "budget_exhausted",
            RejectReason::StaleQuote => "stale_quote",
            RejectReason::SimulationFailed => "simulation_failed",
            RejectReason::None => "none",
        }
    }
}

/// Outcome of the gate chain for one opportunity.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub opportunity: Opportunity,
    pub accepted: bool,
    pub reason: RejectReason,
    pub net_profit_usd: Decimal,
    pub evaluated_at: DateTime<Utc>,
}

impl Decision {
    pub fn accept(opportunity: Opportunity, net_profit_usd: Decimal) -> Self {
        Self {
            opportunity,
            accepted: true,
            reason: RejectReason::None,
            net_profit_usd,
            evaluated_at: Utc::now(),
        }
    }

    pub fn reject(opportunity: Opportunity, reason: RejectReason, net_profit_usd: Decimal) -> Self {
        Self {
            opportunity,
            accepted: false,
            reason,
            net_profit_usd,
            evaluated_at: Utc::now(),
        }
    }
}
