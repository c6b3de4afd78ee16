//! Display and printing utilities

use std::collections::HashMap;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::types::{Decision, ExecutionResult, Opportunity};

pub fn print_opportunity(opportunity: &Opportunity) {
    info!(
        "🎯 {} opportunity {}: {} (gross ${:.2})",
        opportunity.kind_name(),
        opportunity.id,
        opportunity.describe(),
        opportunity.gross_profit_usd
    );
}

pub fn print_decision(decision: &Decision) {
    if decision.accepted {
        info!(
            opportunity_id = %decision.opportunity.id,
            net_profit = %format!("${:.2}", decision.net_profit_usd),
            "✅ Opportunity accepted by gate chain"
        );
    } else {
        info!(
            opportunity_id = %decision.opportunity.id,
            reason = decision.reason.as_str(),
            net_profit = %format!("${:.2}", decision.net_profit_usd),
            "Opportunity rejected"
        );
    }
}

pub fn print_execution(result: &ExecutionResult) {
    match result.outcome() {
        "confirmed" => {
            info!(
                tx_hash = result.tx_hash.as_deref().unwrap_or("-"),
                gas_cost = %format!("${:.4}", result.gas_cost_usd),
                time_ms = result.execution_time_ms,
                "✅ Execution confirmed"
            );
        }
        "reverted" => {
            warn!(
                tx_hash = result.tx_hash.as_deref().unwrap_or("-"),
                gas_cost = %format!("${:.4}", result.gas_cost_usd),
                "Transaction reverted on-chain (gas spent, budgeted loss)"
            );
        }
        "simulated" => {
            info!(
                opportunity_id = %result.opportunity_id,
                "Dry run: simulation succeeded, no transaction sent"
            );
        }
        "aborted" => {
            warn!(
                opportunity_id = %result.opportunity_id,
                reason = ?result.abort_reason,
                error = result.error_message.as_deref().unwrap_or("-"),
                "Execution aborted before submission"
            );
        }
        _ => {
            error!(
                opportunity_id = %result.opportunity_id,
                tx_hash = result.tx_hash.as_deref().unwrap_or("-"),
                "Submitted but no receipt within timeout"
            );
        }
    }
}

pub fn print_session_stats(
    start_time: Instant,
    cycles: u64,
    opportunities: u64,
    accepted: u64,
    executions: u64,
    confirmed: u64,
    reverted: u64,
    error_counts: &HashMap<String, u32>,
) {
    let runtime_min = start_time.elapsed().as_secs() / 60;

    info!("📊 Session statistics ({} minutes)", runtime_min);
    info!("   Scan cycles: {}", cycles);
    info!("   Opportunities detected: {}", opportunities);
    info!("   Accepted by gate chain: {}", accepted);
    info!("   Executions attempted: {}", executions);
    info!("   Confirmed: {} | Reverted: {}", confirmed, reverted);

    if !error_counts.is_empty() {
        info!("   Error summary:");
        for (error_type, count) in error_counts.iter() {
            info!("     {}: {}", error_type, count);
        }
    }
}
