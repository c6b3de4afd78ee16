//! Mathematical utility functions

use alloy::primitives::U256;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::str::FromStr;

pub fn pow10(n: i32) -> Decimal {
    match n {
        0 => dec!(1),
        6 => dec!(1_000_000),
        8 => dec!(100_000_000),
        18 => dec!(1_000_000_000_000_000_000),
        _ => {
            let mut result = dec!(1);
            if n > 0 {
                for _ in 0..n {
                    result *= dec!(10);
                }
            } else {
                for _ in 0..(-n) {
                    result /= dec!(10);
                }
            }
            result
        }
    }
}

/// Base-unit token amount to display units. Returns None when the amount
/// exceeds Decimal's range (a sign of malformed chain data, not a real
/// balance).
pub fn u256_to_decimal(amount: U256, decimals: u8) -> Option<Decimal> {
    Decimal::from_str(&amount.to_string())
        .ok()
        .map(|d| d / pow10(decimals as i32))
}

/// Display-unit amount to integer base units, truncating dust below the
/// token's precision.
pub fn decimal_to_u256(amount: Decimal, decimals: u8) -> Option<U256> {
    if amount.is_sign_negative() {
        return None;
    }
    let scaled = (amount * pow10(decimals as i32)).trunc().normalize();
    U256::from_str(&scaled.to_string()).ok()
}

/// Wei cost (gas_used * gas_price) to USD given the native token price.
pub fn wei_to_usd(wei: U256, native_price_usd: Decimal) -> Option<Decimal> {
    u256_to_decimal(wei, 18).map(|native| native * native_price_usd)
}
