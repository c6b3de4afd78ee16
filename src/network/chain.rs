//! Narrow blockchain client used by the pipeline

use alloy::consensus::TxEnvelope;
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::Provider;
use alloy::rpc::types::eth::{Filter, Log, TransactionReceipt, TransactionRequest};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::errors::{BotError, BotResult};
use crate::network::retry::{retry_with_backoff, RetryConfig};
use crate::ConcreteProvider;

/// Thin wrapper exposing exactly the chain operations the pipeline needs:
/// view calls, log queries, gas price, nonce, signed submission, and a
/// bounded receipt wait. Connection setup and key storage live elsewhere.
#[derive(Clone)]
pub struct ChainClient {
    provider: Arc<ConcreteProvider>,
}

impl ChainClient {
    pub fn new(provider: Arc<ConcreteProvider>) -> Self {
        Self { provider }
    }

    /// Read-only contract call with the default retry policy.
    pub async fn read(&self, to: Address, calldata: Vec<u8>) -> BotResult<Bytes> {
        let tx = TransactionRequest::default().to(to).input(calldata.into());
        retry_with_backoff(
            || async {
                self.provider
                    .call(&tx)
                    .await
                    .with_context(|| format!("view call to {to}"))
            },
            &RetryConfig::default(),
            "contract read",
        )
        .await
    }

    /// Single-shot `eth_call` with the exact request that would be submitted.
    /// No retry: a simulation failure is a verdict on the payload, not a
    /// transport hiccup.
    pub async fn simulate(&self, tx: &TransactionRequest) -> BotResult<Bytes> {
        self.provider
            .call(tx)
            .await
            .map_err(|e| BotError::SimulationFailed {
                reason: e.to_string(),
            })
    }

    pub async fn get_logs(&self, filter: &Filter) -> BotResult<Vec<Log>> {
        retry_with_backoff(
            || async {
                self.provider
                    .get_logs(filter)
                    .await
                    .context("eth_getLogs failed")
            },
            &RetryConfig::default(),
            "log query",
        )
        .await
    }

    pub async fn block_number(&self) -> BotResult<u64> {
        retry_with_backoff(
            || async {
                self.provider
                    .get_block_number()
                    .await
                    .context("eth_blockNumber failed")
            },
            &RetryConfig::default(),
            "block number",
        )
        .await
    }

    /// Current gas price in wei.
    pub async fn gas_price(&self) -> BotResult<u128> {
        retry_with_backoff(
            || async {
                self.provider
                    .get_gas_price()
                    .await
                    .context("eth_gasPrice failed")
            },
            &RetryConfig::default(),
            "gas price",
        )
        .await
    }

    pub async fn nonce(&self, address: Address) -> BotResult<u64> {
        retry_with_backoff(
            || async {
                self.provider
                    .get_transaction_count(address)
                    .await
                    .context("eth_getTransactionCount failed")
            },
            &RetryConfig::default(),
            "nonce query",
        )
        .await
    }

    /// Broadcast a signed transaction. No retry: a rebroadcast of the same
    /// nonce either races itself or double-submits.
    pub async fn send_signed(&self, envelope: TxEnvelope) -> BotResult<B256> {
        let pending = self
            .provider
            .send_tx_envelope(envelope)
            .await
            .map_err(|e| BotError::SubmissionFailed {
                reason: e.to_string(),
            })?;
        Ok(*pending.tx_hash())
    }

    /// Poll for the receipt until `timeout` elapses. `None` means the
    /// transaction is still pending; the caller decides what that costs.
    pub async fn wait_for_receipt(
        &self,
        hash: B256,
        timeout: Duration,
    ) -> BotResult<Option<TransactionReceipt>> {
        let poll_interval = Duration::from_secs(2);
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            match self.provider.get_transaction_receipt(hash).await {
                Ok(Some(receipt)) => return Ok(Some(receipt)),
                Ok(None) => debug!(tx_hash = %hash, "Receipt not yet available"),
                Err(e) => debug!(tx_hash = %hash, error = %e, "Receipt query failed, will re-poll"),
            }

            if tokio::time::Instant::now() + poll_interval > deadline {
                return Ok(None);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}
