//! Guarded transaction execution

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, U256};
use alloy::rpc::types::eth::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolValue;
use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::prelude::*;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::{Config, GAS_LIMIT_ARBITRAGE, GAS_LIMIT_LIQUIDATION};
use crate::detector::encode_get_user_account_data;
use crate::errors::{BotError, BotResult};
use crate::evaluator::check_freshness;
use crate::execution::payload::{
    encode_request_flash_loan, encode_request_liquidation, loan_premium,
    min_output_after_slippage, LIQUIDATION_POOL_FEE,
};
use crate::network::ChainClient;
use crate::types::{
    ExecutionResult, Opportunity, OpportunityKind, Quote, RejectReason, AAVE_V3_POOL,
    CHAIN_ID_POLYGON, HEALTH_FACTOR_ONE,
};
use crate::utils::wei_to_usd;
use crate::venues::{quote_router, PriceBook};

/// Builds, simulates and (outside dry-run) submits one transaction per
/// accepted opportunity. The simulate-before-send discipline is structural:
/// the submission path cannot be reached without a successful `eth_call` of
/// the exact payload first.
pub struct ExecutionEngine {
    chain: ChainClient,
    wallet: Option<EthereumWallet>,
    sender: Option<Address>,
    config: Config,
}

impl ExecutionEngine {
    pub fn new(chain: ChainClient, config: &Config) -> Result<Self> {
        let (wallet, sender) = match &config.private_key {
            Some(pk) => {
                let signer =
                    PrivateKeySigner::from_str(pk).context("Failed to parse private key")?;
                let sender = signer.address();
                (Some(EthereumWallet::from(signer)), Some(sender))
            }
            None => (None, None),
        };

        Ok(Self {
            chain,
            wallet,
            sender,
            config: config.clone(),
        })
    }

    /// Act on an accepted opportunity. `detection_quote` is the quote that
    /// sized an arbitrage trade (liquidations carry none); the engine
    /// re-checks it against live state right before submission. The tracker
    /// is only touched after a transaction is actually broadcast.
    pub async fn execute(
        &self,
        opportunity: &Opportunity,
        detection_quote: Option<&Quote>,
        gas_price_wei: u128,
        tracker: &mut crate::tracker::AttemptTracker,
        prices: &PriceBook,
    ) -> ExecutionResult {
        let started = Instant::now();
        let mut result = ExecutionResult::pending(&opportunity.id);

        // A quote past the freshness window cannot justify an execution
        if let Some(quote) = detection_quote {
            if !quote.is_fresh(self.config.quote_max_age_secs) {
                result.abort_reason = Some(RejectReason::StaleQuote);
                result.error_message =
                    Some("detection quote aged out before execution".to_string());
                result.execution_time_ms = started.elapsed().as_millis() as u64;
                return result;
            }
        }

        let tx = match self.build_request(opportunity, gas_price_wei) {
            Ok(tx) => tx,
            Err(e) => {
                result.error_message = Some(e.to_string());
                result.execution_time_ms = started.elapsed().as_millis() as u64;
                return result;
            }
        };

        // Simulate with the exact payload and gas limit of the real thing
        if let Err(e) = self.chain.simulate(&tx).await {
            warn!(opportunity_id = %opportunity.id, error = %e, "Simulation failed, aborting");
            result.abort_reason = Some(RejectReason::SimulationFailed);
            result.error_message = Some(e.to_string());
            result.execution_time_ms = started.elapsed().as_millis() as u64;
            return result;
        }
        result.simulated = true;
        info!(opportunity_id = %opportunity.id, "Simulation succeeded");

        if self.config.dry_run {
            result.execution_time_ms = started.elapsed().as_millis() as u64;
            return result;
        }

        // The market may have moved while we were simulating; re-check
        if let Err(reason) = self.verify_freshness(opportunity, detection_quote).await {
            warn!(
                opportunity_id = %opportunity.id,
                reason = reason.as_str(),
                "Pre-submission re-check failed, aborting"
            );
            result.abort_reason = Some(reason);
            result.execution_time_ms = started.elapsed().as_millis() as u64;
            return result;
        }

        match self.sign_and_submit(tx).await {
            Ok(hash) => {
                result.submitted = true;
                result.tx_hash = Some(hash.to_string());
                tracker.record_attempt(Utc::now().date_naive());
                info!(tx_hash = %hash, "Transaction submitted");

                match self
                    .chain
                    .wait_for_receipt(hash, Duration::from_secs(self.config.receipt_timeout_secs))
                    .await
                {
                    Ok(Some(receipt)) => {
                        let cost_wei =
                            U256::from(receipt.gas_used) * U256::from(receipt.effective_gas_price);
                        let gas_cost_usd = wei_to_usd(cost_wei, prices.native_price_usd())
                            .unwrap_or(Decimal::ZERO);
                        // Gas was burned whether the transaction succeeded
                        // or reverted
                        tracker.record_gas_spend(gas_cost_usd);
                        result.gas_cost_usd = gas_cost_usd;

                        if receipt.status() {
                            result.confirmed = true;
                        } else {
                            result.reverted = true;
                        }
                    }
                    Ok(None) => {
                        warn!(tx_hash = %hash, "No receipt within timeout, outcome unknown");
                        result.error_message = Some("receipt wait timed out".to_string());
                    }
                    Err(e) => {
                        warn!(tx_hash = %hash, error = %e, "Receipt query failed");
                        result.error_message = Some(e.to_string());
                    }
                }
            }
            Err(e) => {
                // Nothing was broadcast, so no attempt and no spend recorded
                warn!(opportunity_id = %opportunity.id, error = %e, "Submission failed");
                result.error_message = Some(e.to_string());
            }
        }

        result.execution_time_ms = started.elapsed().as_millis() as u64;
        result
    }

    /// Build the full request used for both simulation and submission.
    fn build_request(
        &self,
        opportunity: &Opportunity,
        gas_price_wei: u128,
    ) -> BotResult<TransactionRequest> {
        let (to, calldata, gas_limit) = match &opportunity.kind {
            OpportunityKind::Arbitrage {
                buy_venue,
                sell_venue,
                asset_in,
                asset_out,
                notional,
            } => {
                let contract = self.config.flash_loan_contract.ok_or_else(|| {
                    BotError::SubmissionFailed {
                        reason: "flash loan contract not configured".to_string(),
                    }
                })?;
                let (Some(router_a), Some(router_b)) = (buy_venue.router(), sell_venue.router())
                else {
                    return Err(BotError::SubmissionFailed {
                        reason: "arbitrage venues must have on-chain routers".to_string(),
                    });
                };
                let calldata = encode_request_flash_loan(
                    asset_in.address(),
                    *notional,
                    router_a,
                    router_b,
                    asset_out.address(),
                );
                (contract, calldata, GAS_LIMIT_ARBITRAGE)
            }
            OpportunityKind::Liquidation {
                borrower,
                debt_asset,
                debt_amount,
                collateral_asset,
                ..
            } => {
                let contract = self.config.liquidation_contract.ok_or_else(|| {
                    BotError::SubmissionFailed {
                        reason: "liquidation contract not configured".to_string(),
                    }
                })?;
                let fee_bps = (self.config.flash_loan_fee_pct * Decimal::from(100))
                    .to_u32()
                    .unwrap_or(9);
                // The swap back must at least repay the loan plus premium
                let amount_out_min = *debt_amount + loan_premium(*debt_amount, fee_bps);
                let calldata = encode_request_liquidation(
                    *borrower,
                    debt_asset.address(),
                    collateral_asset.address(),
                    *debt_amount,
                    LIQUIDATION_POOL_FEE,
                    amount_out_min,
                );
                (contract, calldata, GAS_LIMIT_LIQUIDATION)
            }
        };

        let mut tx = TransactionRequest::default()
            .to(to)
            .input(calldata.into())
            .with_value(U256::ZERO)
            .with_gas_limit(gas_limit)
            .with_gas_price(gas_price_wei);
        if let Some(sender) = self.sender {
            tx = tx.with_from(sender);
        }
        Ok(tx)
    }

    /// Pre-submission re-check: the arbitrage leg is re-quoted and must stay
    /// within the drift tolerance; a liquidation target must still be below
    /// the health threshold. Failure to verify counts as stale.
    async fn verify_freshness(
        &self,
        opportunity: &Opportunity,
        detection_quote: Option<&Quote>,
    ) -> Result<(), RejectReason> {
        match &opportunity.kind {
            OpportunityKind::Arbitrage {
                buy_venue,
                asset_in,
                asset_out,
                notional,
                ..
            } => {
                // An arbitrage without its sizing quote cannot be verified
                let detection_quote = detection_quote.ok_or(RejectReason::StaleQuote)?;
                let requote =
                    quote_router(&self.chain, *buy_venue, *asset_in, *asset_out, *notional)
                        .await
                        .map_err(|_| RejectReason::StaleQuote)?;
                // The live market must still clear the worst fill the
                // slippage tolerance accepts
                let floor = min_output_after_slippage(
                    detection_quote.amount_out,
                    self.config.slippage_tolerance_bps,
                );
                if requote.amount_out < floor {
                    return Err(RejectReason::StaleQuote);
                }
                check_freshness(
                    detection_quote,
                    &requote,
                    self.config.requote_tolerance_pct,
                )
            }
            OpportunityKind::Liquidation { borrower, .. } => {
                let raw = self
                    .chain
                    .read(AAVE_V3_POOL, encode_get_user_account_data(*borrower))
                    .await
                    .map_err(|_| RejectReason::StaleQuote)?;
                let decoded = <(U256, U256, U256, U256, U256, U256)>::abi_decode(&raw, true)
                    .map_err(|_| RejectReason::StaleQuote)?;
                if decoded.5 < HEALTH_FACTOR_ONE {
                    Ok(())
                } else {
                    Err(RejectReason::StaleQuote)
                }
            }
        }
    }

    async fn sign_and_submit(&self, tx: TransactionRequest) -> BotResult<alloy::primitives::B256> {
        let (Some(wallet), Some(sender)) = (&self.wallet, self.sender) else {
            return Err(BotError::SubmissionFailed {
                reason: "no signer configured".to_string(),
            });
        };

        let nonce = self.chain.nonce(sender).await?;
        let envelope = tx
            .with_nonce(nonce)
            .with_chain_id(CHAIN_ID_POLYGON)
            .build(wallet)
            .await
            .map_err(|e| BotError::SubmissionFailed {
                reason: format!("signing failed: {e}"),
            })?;

        self.chain.send_signed(envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::keccak256;
    use alloy::providers::ProviderBuilder;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use crate::tracker::AttemptTracker;
    use crate::types::{Opportunity, OpportunityKind, Token, Venue};
    use crate::venues::PriceBook;

    fn test_config() -> Config {
        let mut config = Config::load();
        config.private_key = None;
        config.dry_run = true;
        config.quote_max_age_secs = 10;
        config.flash_loan_fee_pct = dec!(0.09);
        config.flash_loan_contract = Some(Address::repeat_byte(0xAA));
        config.liquidation_contract = Some(Address::repeat_byte(0xBB));
        config
    }

    /// Engine wired to an unreachable endpoint: any chain call fails, which
    /// is exactly what the abort paths need.
    fn offline_engine(config: &Config) -> ExecutionEngine {
        let provider = std::sync::Arc::new(
            ProviderBuilder::new()
                .on_http("http://127.0.0.1:1".parse().unwrap())
                .boxed(),
        );
        ExecutionEngine::new(ChainClient::new(provider), config).unwrap()
    }

    fn arbitrage_opportunity() -> Opportunity {
        Opportunity::new(
            OpportunityKind::Arbitrage {
                buy_venue: Venue::QuickSwap,
                sell_venue: Venue::SushiSwap,
                asset_in: Token::Usdc,
                asset_out: Token::Weth,
                notional: U256::from(1_000_000_000u64),
            },
            dec!(10),
        )
    }

    fn buy_leg_quote() -> Quote {
        Quote::new(
            Venue::QuickSwap,
            Token::Usdc,
            Token::Weth,
            U256::from(1_000_000_000u64),
            U256::from(500_000_000_000_000_000u64),
        )
    }

    #[tokio::test]
    async fn aged_quote_aborts_before_any_chain_call() {
        let config = test_config();
        let engine = offline_engine(&config);
        let mut tracker = AttemptTracker::new(Utc::now().date_naive());
        let prices = PriceBook::fallback(None);

        let mut quote = buy_leg_quote();
        quote.fetched_at = Utc::now() - chrono::Duration::seconds(60);

        let result = engine
            .execute(&arbitrage_opportunity(), Some(&quote), 30_000_000_000, &mut tracker, &prices)
            .await;

        assert!(!result.simulated);
        assert!(!result.submitted);
        assert_eq!(result.abort_reason, Some(RejectReason::StaleQuote));
        assert_eq!(tracker.attempts_on(Utc::now().date_naive()), 0);
    }

    #[tokio::test]
    async fn failed_simulation_sends_nothing_and_leaves_tracker_untouched() {
        let config = test_config();
        let engine = offline_engine(&config);
        let mut tracker = AttemptTracker::new(Utc::now().date_naive());
        let prices = PriceBook::fallback(None);
        let quote = buy_leg_quote();

        let result = engine
            .execute(&arbitrage_opportunity(), Some(&quote), 30_000_000_000, &mut tracker, &prices)
            .await;

        // The unreachable endpoint fails the eth_call; nothing proceeds
        assert!(!result.simulated);
        assert!(!result.submitted);
        assert!(result.tx_hash.is_none());
        assert_eq!(result.abort_reason, Some(RejectReason::SimulationFailed));
        assert_eq!(tracker.attempts_on(Utc::now().date_naive()), 0);
        assert_eq!(tracker.cumulative_gas_spend_usd(), rust_decimal::Decimal::ZERO);
    }

    #[test]
    fn arbitrage_request_targets_flash_loan_contract() {
        let config = test_config();
        let engine = offline_engine(&config);

        let tx = engine
            .build_request(&arbitrage_opportunity(), 30_000_000_000)
            .unwrap();

        let input = tx.input.input.clone().unwrap();
        assert_eq!(
            &input[..4],
            &keccak256("requestFlashLoan(address,uint256,address,address,address)")[..4]
        );
        assert_eq!(tx.gas, Some(GAS_LIMIT_ARBITRAGE as _));
        assert_eq!(tx.gas_price, Some(30_000_000_000u128));
    }

    #[test]
    fn liquidation_min_out_covers_loan_plus_premium() {
        let config = test_config();
        let engine = offline_engine(&config);

        let debt_amount = U256::from(1_000_000_000u64); // 1000 USDC
        let opportunity = Opportunity::new(
            OpportunityKind::Liquidation {
                borrower: Address::repeat_byte(0x42),
                debt_asset: Token::Usdc,
                debt_amount,
                collateral_asset: Token::Weth,
                debt_value_usd: dec!(1000),
            },
            dec!(50),
        );

        let tx = engine.build_request(&opportunity, 30_000_000_000).unwrap();
        let input = tx.input.input.clone().unwrap();

        // Final word is amountOutMin: principal plus the 0.09% premium
        let min_out = U256::from_be_slice(&input[4 + 32 * 5..]);
        assert_eq!(min_out, U256::from(1_000_900_000u64));
        assert_eq!(tx.gas, Some(GAS_LIMIT_LIQUIDATION as _));
    }

    #[test]
    fn missing_contract_is_a_submission_failure() {
        let mut config = test_config();
        config.flash_loan_contract = None;
        let engine = offline_engine(&config);

        let err = engine
            .build_request(&arbitrage_opportunity(), 30_000_000_000)
            .unwrap_err();
        assert!(matches!(err, BotError::SubmissionFailed { .. }));
    }
}
