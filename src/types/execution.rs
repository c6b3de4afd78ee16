//! Execution result types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::RejectReason;

/// What actually happened when the engine acted on an accepted opportunity.
///
/// The flags encode the per-opportunity state machine: `submitted` is never
/// true without `simulated`, and `confirmed`/`reverted` are only meaningful
/// once `submitted` is.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub opportunity_id: String,
    pub timestamp: DateTime<Utc>,
    pub tx_hash: Option<String>,
    pub simulated: bool,
    pub submitted: bool,
    pub confirmed: bool,
    pub reverted: bool,
    pub gas_cost_usd: Decimal,
    pub execution_time_ms: u64,
    /// Set when the engine aborted before submission (simulation failure or
    /// a stale re-quote); mirrors the decision reason vocabulary.
    pub abort_reason: Option<RejectReason>,
    pub error_message: Option<String>,
}

impl ExecutionResult {
    pub fn pending(opportunity_id: &str) -> Self {
        Self {
            opportunity_id: opportunity_id.to_string(),
            timestamp: Utc::now(),
            tx_hash: None,
            simulated: false,
            submitted: false,
            confirmed: false,
            reverted: false,
            gas_cost_usd: Decimal::ZERO,
            execution_time_ms: 0,
            abort_reason: None,
            error_message: None,
        }
    }

    pub fn outcome(&self) -> &'static str {
        if self.confirmed {
            "confirmed"
        } else if self.reverted {
            "reverted"
        } else if self.submitted {
            "submitted"
        } else if self.simulated {
            "simulated"
        } else {
            "aborted"
        }
    }
}
