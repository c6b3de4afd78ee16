//! Custom error types for the bot

use alloy::primitives::Address;
use thiserror::Error;

/// Error taxonomy for the opportunity pipeline. Nothing here is fatal to the
/// process: transient failures skip a cycle, malformed data drops one data
/// point, and execution-stage failures abort a single opportunity.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("transient network error: {context} (after {retry_count} attempts)")]
    TransientNetwork {
        context: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("malformed data: {context}")]
    MalformedData { context: String },

    #[error("contract call failed: {contract} - {message}")]
    Contract {
        contract: Address,
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("simulation failed: {reason}")]
    SimulationFailed { reason: String },

    #[error("submission failed: {reason}")]
    SubmissionFailed { reason: String },
}

impl BotError {
    pub fn transient(context: impl Into<String>) -> Self {
        BotError::TransientNetwork {
            context: context.into(),
            source: None,
            retry_count: 0,
        }
    }

    pub fn malformed(context: impl Into<String>) -> Self {
        BotError::MalformedData {
            context: context.into(),
        }
    }

    /// Transient failures may resolve on the next cycle; everything else is
    /// a property of the data or the transaction itself.
    pub fn is_transient(&self) -> bool {
        matches!(self, BotError::TransientNetwork { .. })
    }
}

pub type BotResult<T> = Result<T, BotError>;
