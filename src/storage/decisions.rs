//! Decision record storage

use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::types::Decision;

pub fn save_decision(decision: &Decision) -> Result<()> {
    let filename = format!(
        "output/decisions/decisions_{}.jsonl",
        Utc::now().format("%Y-%m-%d")
    );

    let mut file = OpenOptions::new().create(true).append(true).open(&filename)?;

    writeln!(file, "{}", serde_json::to_string(decision)?)?;

    debug!(
        opportunity_id = %decision.opportunity.id,
        accepted = decision.accepted,
        reason = decision.reason.as_str(),
        "Saved decision record"
    );

    Ok(())
}
