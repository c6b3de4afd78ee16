//! Bot configuration settings and environment variable handling

use alloy::primitives::Address;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;

// Hard bounds applied over whatever the environment supplies
pub const MIN_LOAN_USDC: Decimal = dec!(1);
pub const MAX_LOAN_USDC: Decimal = dec!(100_000);
pub const MAX_SLIPPAGE_BPS: u32 = 100; // 1%
pub const ABS_MAX_GAS_PRICE_GWEI: u32 = 500;

// Freshness and receipt handling
pub const DEFAULT_QUOTE_MAX_AGE_SECS: u64 = 10;
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_VENUE_TIMEOUT_SECS: u64 = 5;

// Gas limits observed from the deployed executor contracts
pub const GAS_LIMIT_ARBITRAGE: u64 = 500_000;
pub const GAS_LIMIT_LIQUIDATION: u64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct Config {
    // Chain access
    pub rpc_url: String,
    pub private_key: Option<String>,
    pub oneinch_api_key: Option<String>,
    pub flash_loan_contract: Option<Address>,
    pub liquidation_contract: Option<Address>,

    // Scheduling
    pub scan_interval_secs: u64,
    pub cooldown_secs: u64,
    pub dry_run: bool,

    // Gate chain thresholds
    pub min_profit_usd: Decimal,
    pub slippage_tolerance_bps: u32,
    pub max_gas_price_gwei: u32,
    pub max_daily_attempts: u32,
    pub budget_usd: Decimal,

    // Detection parameters
    pub loan_amount_usdc: Decimal,
    pub min_spread_pct: Decimal,
    pub scan_block_window: u64,
    pub min_event_value_usd: Decimal,
    pub cache_clear_cycles: u64,

    // Fee model (policy inputs, not structure)
    pub liquidation_bonus_pct: Decimal,
    pub flash_loan_fee_pct: Decimal,
    pub swap_fee_pct: Decimal,
    pub fixed_overhead_usd: Decimal,

    // Freshness / timeouts
    pub quote_max_age_secs: u64,
    pub requote_tolerance_pct: Decimal,
    pub venue_timeout_secs: u64,
    pub receipt_timeout_secs: u64,

    // Resilience
    pub max_consecutive_errors: u32,
    pub circuit_breaker_cooldown_secs: u64,

    // Price override for the native gas token (skips the live lookup)
    pub native_price_override_usd: Option<Decimal>,
}

fn env_decimal(name: &str, default: Decimal) -> Decimal {
    env::var(name)
        .ok()
        .and_then(|s| Decimal::from_str(&s).ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_address(name: &str) -> Option<Address> {
    env::var(name).ok().and_then(|s| Address::from_str(&s).ok())
}

impl Config {
    pub fn load() -> Self {
        Self {
            rpc_url: env::var("POLYGON_RPC_URL")
                .unwrap_or_else(|_| "https://polygon-rpc.com".to_string()),
            private_key: env::var("PRIVATE_KEY").ok(),
            oneinch_api_key: env::var("ONEINCH_API_KEY").ok(),
            flash_loan_contract: env_address("FLASH_LOAN_CONTRACT"),
            liquidation_contract: env_address("LIQUIDATION_CONTRACT"),

            scan_interval_secs: env_u64("SCAN_INTERVAL_SECONDS", 3),
            cooldown_secs: env_u64("COOLDOWN_SECONDS", 10),
            dry_run: env_bool("DRY_RUN", true),

            min_profit_usd: env_decimal("MIN_PROFIT_USD", dec!(2.0)),
            slippage_tolerance_bps: env_u32("SLIPPAGE_TOLERANCE_BPS", 30).min(MAX_SLIPPAGE_BPS),
            max_gas_price_gwei: env_u32("MAX_GAS_GWEI", 80).min(ABS_MAX_GAS_PRICE_GWEI),
            max_daily_attempts: env_u32("MAX_DAILY_ATTEMPTS", 3),
            budget_usd: env_decimal("BUDGET_USD", dec!(30.0)),

            loan_amount_usdc: env_decimal("LOAN_AMOUNT_USDC", dec!(10.0))
                .max(MIN_LOAN_USDC)
                .min(MAX_LOAN_USDC),
            min_spread_pct: env_decimal("MIN_SPREAD_PCT", dec!(1.0)),
            scan_block_window: env_u64("SCAN_BLOCK_WINDOW", 2000),
            min_event_value_usd: env_decimal("MIN_EVENT_VALUE_USD", dec!(50.0)),
            cache_clear_cycles: env_u64("CACHE_CLEAR_CYCLES", 10),

            liquidation_bonus_pct: env_decimal("LIQUIDATION_BONUS_PCT", dec!(5.0)),
            flash_loan_fee_pct: env_decimal("FLASH_LOAN_FEE_PCT", dec!(0.09)),
            swap_fee_pct: env_decimal("SWAP_FEE_PCT", dec!(0.3)),
            fixed_overhead_usd: env_decimal("FIXED_OVERHEAD_USD", dec!(0.50)),

            quote_max_age_secs: env_u64("QUOTE_MAX_AGE_SECONDS", DEFAULT_QUOTE_MAX_AGE_SECS),
            requote_tolerance_pct: env_decimal("REQUOTE_TOLERANCE_PCT", dec!(1.0)),
            venue_timeout_secs: env_u64("VENUE_TIMEOUT_SECONDS", DEFAULT_VENUE_TIMEOUT_SECS),
            receipt_timeout_secs: env_u64("RECEIPT_TIMEOUT_SECONDS", DEFAULT_RECEIPT_TIMEOUT_SECS),

            max_consecutive_errors: env_u32("MAX_CONSECUTIVE_ERRORS", 5),
            circuit_breaker_cooldown_secs: env_u64("CIRCUIT_BREAKER_COOLDOWN_SECONDS", 300),

            native_price_override_usd: env::var("MATIC_USD")
                .ok()
                .and_then(|s| Decimal::from_str(&s).ok()),
        }
    }

    /// Slippage tolerance expressed in percent.
    pub fn slippage_tolerance_pct(&self) -> Decimal {
        Decimal::from(self.slippage_tolerance_bps) / dec!(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slippage_bps_to_pct() {
        let mut config = Config::load();
        config.slippage_tolerance_bps = 30;
        assert_eq!(config.slippage_tolerance_pct(), dec!(0.3));
    }
}
