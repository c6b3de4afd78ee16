//! Execution result storage

use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::info;

use crate::types::ExecutionResult;

pub fn save_execution(result: &ExecutionResult) -> Result<()> {
    let filename = format!(
        "output/executions/executions_{}.jsonl",
        Utc::now().format("%Y-%m-%d")
    );

    let mut file = OpenOptions::new().create(true).append(true).open(&filename)?;

    writeln!(file, "{}", serde_json::to_string(result)?)?;

    info!(
        opportunity_id = %result.opportunity_id,
        outcome = result.outcome(),
        gas_cost = %result.gas_cost_usd,
        "Saved execution record"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_record_round_trips_through_serde() {
        let result = ExecutionResult::pending("test-opportunity");
        let json = serde_json::to_string(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["opportunity_id"], "test-opportunity");
        assert_eq!(value["simulated"], false);
        assert_eq!(value["submitted"], false);
    }
}
