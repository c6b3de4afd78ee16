//! Aave V3 liquidation scanning

use alloy::primitives::{keccak256, Address, U256};
use alloy::rpc::types::eth::{Filter, Log};
use alloy::sol_types::SolValue;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{BotError, BotResult};
use crate::network::ChainClient;
use crate::types::{
    Opportunity, OpportunityKind, PositionSnapshot, Token, AAVE_V3_POOL, BORROW_EVENT_TOPIC,
};
use crate::venues::PriceBook;

/// A decoded Borrow event from the pool.
#[derive(Debug, Clone)]
pub struct BorrowEvent {
    pub reserve: Token,
    pub borrower: Address,
    pub amount: U256,
}

/// Decode a raw Borrow log. Returns None for logs with unexpected shape or
/// reserves outside the known token set; the caller drops those data points.
pub fn decode_borrow_log(log: &Log) -> Option<BorrowEvent> {
    let topics = log.inner.data.topics();
    if topics.len() < 3 {
        return None;
    }

    let reserve = Token::from_address(Address::from_slice(&topics[1][12..]))?;
    let borrower = Address::from_slice(&topics[2][12..]);

    let data = &log.inner.data.data;
    if data.len() < 32 {
        return None;
    }
    let amount = U256::from_be_slice(&data[..32]);

    Some(BorrowEvent {
        reserve,
        borrower,
        amount,
    })
}

/// ABI-encode `getUserAccountData(address)`.
pub fn encode_get_user_account_data(user: Address) -> Vec<u8> {
    let mut encoded = keccak256("getUserAccountData(address)")[..4].to_vec();
    encoded.extend_from_slice(&[0u8; 12]);
    encoded.extend_from_slice(user.as_slice());
    encoded
}

/// Estimated net profit of liquidating a position under the fixed fee model:
/// liquidation bonus minus flash-loan fee minus swap fee minus overhead.
pub fn candidate_profit_usd(debt_value_usd: Decimal, config: &Config) -> Decimal {
    let hundred = Decimal::from(100);
    debt_value_usd * config.liquidation_bonus_pct / hundred
        - debt_value_usd * config.flash_loan_fee_pct / hundred
        - debt_value_usd * config.swap_fee_pct / hundred
        - config.fixed_overhead_usd
}

/// Pick the collateral candidate with the highest estimated profit; ties go
/// to the earlier entry in the debt asset's candidate list.
pub fn pick_collateral(
    debt_asset: Token,
    debt_value_usd: Decimal,
    config: &Config,
) -> Option<(Token, Decimal)> {
    let mut best: Option<(Token, Decimal)> = None;
    for &candidate in debt_asset.collateral_candidates() {
        let profit = candidate_profit_usd(debt_value_usd, config);
        debug!(
            collateral = candidate.symbol(),
            profit = %format!("{profit:.2}"),
            "Collateral candidate evaluated"
        );
        if best.as_ref().is_none_or(|(_, p)| profit > *p) {
            best = Some((candidate, profit));
        }
    }
    best
}

/// Scans a trailing block window of Borrow events and checks the health of
/// each distinct borrower found. Borrowers already checked recently are
/// skipped; the cache is cleared every `cache_clear_cycles` scans so that
/// positions which were healthy last time get re-admitted.
pub struct LiquidationScanner {
    checked_borrowers: HashSet<Address>,
    scan_count: u64,
}

impl Default for LiquidationScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LiquidationScanner {
    pub fn new() -> Self {
        Self {
            checked_borrowers: HashSet::new(),
            scan_count: 0,
        }
    }

    pub async fn scan(
        &mut self,
        chain: &ChainClient,
        prices: &PriceBook,
        config: &Config,
    ) -> BotResult<Vec<Opportunity>> {
        self.scan_count += 1;
        if config.cache_clear_cycles > 0 && self.scan_count % config.cache_clear_cycles == 0 {
            debug!(
                cached = self.checked_borrowers.len(),
                "Clearing borrower cache"
            );
            self.checked_borrowers.clear();
        }

        let latest = chain.block_number().await?;
        let from_block = latest.saturating_sub(config.scan_block_window);

        let filter = Filter::new()
            .address(AAVE_V3_POOL)
            .event_signature(BORROW_EVENT_TOPIC)
            .from_block(from_block);

        let logs = chain.get_logs(&filter).await?;
        debug!(
            from_block,
            to_block = latest,
            events = logs.len(),
            "Borrow events fetched"
        );

        // One entry per borrower, keeping the largest borrow above the floor
        let mut to_check: HashMap<Address, BorrowEvent> = HashMap::new();
        for log in &logs {
            let Some(event) = decode_borrow_log(log) else {
                continue;
            };
            let Some(value_usd) = prices.usd_value(event.reserve, event.amount) else {
                continue;
            };
            if value_usd < config.min_event_value_usd {
                continue;
            }
            to_check
                .entry(event.borrower)
                .and_modify(|existing| {
                    if event.amount > existing.amount {
                        *existing = event.clone();
                    }
                })
                .or_insert(event);
        }

        let mut opportunities = Vec::new();

        for (borrower, event) in to_check {
            if self.checked_borrowers.contains(&borrower) {
                continue;
            }
            self.checked_borrowers.insert(borrower);

            let position = match self.fetch_position(chain, &event).await {
                Ok(position) => position,
                Err(e) if e.is_transient() => {
                    warn!(borrower = %borrower, error = %e, "Health query failed, skipping");
                    continue;
                }
                Err(e) => {
                    warn!(borrower = %borrower, error = %e, "Dropping malformed position data");
                    continue;
                }
            };

            if !position.is_liquidatable() {
                continue;
            }

            let Some(debt_value_usd) = prices.usd_value(event.reserve, event.amount) else {
                continue;
            };

            let Some((collateral_asset, _)) =
                pick_collateral(event.reserve, debt_value_usd, config)
            else {
                continue;
            };

            let gross_profit_usd =
                debt_value_usd * config.liquidation_bonus_pct / Decimal::from(100);

            info!(
                borrower = %borrower,
                health_factor = %position
                    .health_factor_ratio()
                    .map(|r| format!("{r:.4}"))
                    .unwrap_or_else(|| "?".to_string()),
                debt = event.reserve.symbol(),
                debt_usd = %format!("{debt_value_usd:.2}"),
                collateral = collateral_asset.symbol(),
                "🚨 Liquidatable position found"
            );

            opportunities.push(Opportunity::new(
                OpportunityKind::Liquidation {
                    borrower,
                    debt_asset: event.reserve,
                    debt_amount: event.amount,
                    collateral_asset,
                    debt_value_usd,
                },
                gross_profit_usd,
            ));
        }

        // Highest estimated profit first; the loop acts on one per cycle
        opportunities.sort_by(|a, b| {
            b.gross_profit_usd
                .cmp(&a.gross_profit_usd)
        });

        Ok(opportunities)
    }

    async fn fetch_position(
        &self,
        chain: &ChainClient,
        event: &BorrowEvent,
    ) -> BotResult<PositionSnapshot> {
        let raw = chain
            .read(AAVE_V3_POOL, encode_get_user_account_data(event.borrower))
            .await?;

        // (totalCollateralBase, totalDebtBase, availableBorrowsBase,
        //  currentLiquidationThreshold, ltv, healthFactor)
        let decoded = <(U256, U256, U256, U256, U256, U256)>::abi_decode(&raw, true)
            .map_err(|e| BotError::malformed(format!("getUserAccountData decode: {e}")))?;

        Ok(PositionSnapshot {
            borrower: event.borrower,
            debt_asset: event.reserve,
            debt_amount: event.amount,
            health_factor: decoded.5,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, LogData, B256};
    use rust_decimal_macros::dec;

    fn test_config() -> Config {
        let mut config = Config::load();
        config.liquidation_bonus_pct = dec!(5.0);
        config.flash_loan_fee_pct = dec!(0.09);
        config.swap_fee_pct = dec!(0.3);
        config.fixed_overhead_usd = dec!(0.50);
        config
    }

    #[test]
    fn fee_model_on_thousand_dollar_debt() {
        // 5% bonus - 0.09% loan fee - 0.3% swap fee - $0.50 overhead
        let profit = candidate_profit_usd(dec!(1000), &test_config());
        assert_eq!(profit, dec!(45.6));
    }

    #[test]
    fn ties_go_to_the_first_candidate() {
        // USDC debt candidates are [WETH, WMATIC, WBTC]; the fee model gives
        // every candidate the same estimate, so WETH must win
        let (collateral, profit) = pick_collateral(Token::Usdc, dec!(1000), &test_config()).unwrap();
        assert_eq!(collateral, Token::Weth);
        assert_eq!(profit, dec!(45.6));
    }

    #[test]
    fn small_debt_can_net_negative() {
        // $10 debt: $0.50 bonus doesn't cover the $0.50 overhead plus fees
        let profit = candidate_profit_usd(dec!(10), &test_config());
        assert!(profit < Decimal::ZERO);
    }

    fn borrow_log(reserve: Address, borrower: Address, amount: U256) -> Log {
        let mut reserve_topic = [0u8; 32];
        reserve_topic[12..].copy_from_slice(reserve.as_slice());
        let mut borrower_topic = [0u8; 32];
        borrower_topic[12..].copy_from_slice(borrower.as_slice());

        let mut data = amount.to_be_bytes::<32>().to_vec();
        // interestRateMode + referralCode words follow the amount
        data.extend_from_slice(&[0u8; 64]);

        Log {
            inner: alloy::primitives::Log {
                address: AAVE_V3_POOL,
                data: LogData::new_unchecked(
                    vec![
                        BORROW_EVENT_TOPIC,
                        B256::from(reserve_topic),
                        B256::from(borrower_topic),
                    ],
                    Bytes::from(data),
                ),
            },
            ..Default::default()
        }
    }

    #[test]
    fn decodes_well_formed_borrow_log() {
        let borrower = Address::repeat_byte(0x42);
        let amount = U256::from(1_000_000_000u64);
        let log = borrow_log(Token::Usdc.address(), borrower, amount);

        let event = decode_borrow_log(&log).unwrap();
        assert_eq!(event.reserve, Token::Usdc);
        assert_eq!(event.borrower, borrower);
        assert_eq!(event.amount, amount);
    }

    #[test]
    fn unknown_reserve_is_dropped() {
        let log = borrow_log(Address::repeat_byte(0x99), Address::repeat_byte(0x42), U256::ONE);
        assert!(decode_borrow_log(&log).is_none());
    }

    #[test]
    fn truncated_log_is_dropped() {
        let mut log = borrow_log(Token::Usdc.address(), Address::repeat_byte(0x42), U256::ONE);
        log.inner.data = LogData::new_unchecked(vec![BORROW_EVENT_TOPIC], Bytes::new());
        assert!(decode_borrow_log(&log).is_none());
    }

    #[test]
    fn account_data_call_encoding() {
        let user = Address::repeat_byte(0x11);
        let encoded = encode_get_user_account_data(user);
        assert_eq!(encoded.len(), 4 + 32);
        assert_eq!(&encoded[..4], &keccak256("getUserAccountData(address)")[..4]);
        assert_eq!(&encoded[16..36], user.as_slice());
    }
}
