//! 1inch aggregator venue: HTTP quotes and swap calldata

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{BotError, BotResult};
use crate::network::retry::{retry_with_backoff, RetryConfig};
use crate::types::{Quote, Token, Venue, CHAIN_ID_POLYGON};

const DEFAULT_BASE_URL: &str = "https://api.1inch.io/v5.0";

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(rename = "toTokenAmount")]
    to_token_amount: String,
}

#[derive(Debug, Deserialize)]
struct SwapResponse {
    tx: SwapTxResponse,
}

#[derive(Debug, Deserialize)]
struct SwapTxResponse {
    to: String,
    data: String,
    #[serde(default)]
    value: String,
}

/// Pre-built swap transaction returned by the aggregator.
#[derive(Debug, Clone)]
pub struct SwapCalldata {
    pub to: Address,
    pub data: Vec<u8>,
    pub value: U256,
}

pub struct OneInchClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chain_id: u64,
}

impl OneInchClient {
    pub fn new(api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(8))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            chain_id: CHAIN_ID_POLYGON,
        })
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}/{}", self.base_url, self.chain_id, path);
        let response = self
            .http
            .get(&url)
            .query(params)
            .header("Authorization", &self.api_key)
            .send()
            .await
            .context("HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("1inch API error: {} - {}", status, body);
        }

        response.json().await.context("Failed to parse JSON response")
    }

    /// Aggregator quote: how much `token_out` for `amount_in` of `token_in`.
    pub async fn quote(
        &self,
        token_in: Token,
        token_out: Token,
        amount_in: U256,
    ) -> BotResult<Quote> {
        let params = [
            ("fromTokenAddress", token_in.address().to_string()),
            ("toTokenAddress", token_out.address().to_string()),
            ("amount", amount_in.to_string()),
        ];

        let response: QuoteResponse = retry_with_backoff(
            || async { self.get_json("quote", &params).await },
            &RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 200,
                max_delay_ms: 2000,
            },
            "1inch quote",
        )
        .await?;

        let amount_out = U256::from_str(&response.to_token_amount).map_err(|_| {
            BotError::malformed(format!(
                "1inch returned non-numeric toTokenAmount: {}",
                response.to_token_amount
            ))
        })?;

        if amount_out.is_zero() {
            return Err(BotError::malformed("1inch returned zero output"));
        }

        Ok(Quote::new(
            Venue::OneInch,
            token_in,
            token_out,
            amount_in,
            amount_out,
        ))
    }

    /// Build swap calldata for embedding in a transaction. Slippage is the
    /// percentage the aggregator may deviate before the swap reverts.
    pub async fn swap_calldata(
        &self,
        token_in: Token,
        token_out: Token,
        amount_in: U256,
        slippage_pct: Decimal,
        from_address: Address,
    ) -> BotResult<SwapCalldata> {
        let params = [
            ("fromTokenAddress", token_in.address().to_string()),
            ("toTokenAddress", token_out.address().to_string()),
            ("amount", amount_in.to_string()),
            ("fromAddress", from_address.to_string()),
            ("slippage", slippage_pct.to_string()),
            ("disableEstimate", "true".to_string()),
            ("allowPartialFill", "false".to_string()),
        ];

        let response: SwapResponse = retry_with_backoff(
            || async { self.get_json("swap", &params).await },
            &RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 200,
                max_delay_ms: 2000,
            },
            "1inch swap calldata",
        )
        .await?;

        let to = Address::from_str(&response.tx.to)
            .map_err(|_| BotError::malformed(format!("bad swap target: {}", response.tx.to)))?;
        let data = hex::decode(response.tx.data.trim_start_matches("0x"))
            .map_err(|_| BotError::malformed("swap calldata is not hex"))?;
        let value = if response.tx.value.is_empty() {
            U256::ZERO
        } else {
            U256::from_str(&response.tx.value)
                .map_err(|_| BotError::malformed(format!("bad swap value: {}", response.tx.value)))?
        };

        Ok(SwapCalldata { to, data, value })
    }

}
