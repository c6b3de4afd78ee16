//! Lending position types

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;

use super::Token;
use crate::utils::u256_to_decimal;

/// Health factor scale used by the pool contract (1e18 = 1.0).
pub const HEALTH_FACTOR_ONE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Snapshot of a borrower's position as reported by the lending pool.
/// `health_factor` keeps the contract's 18-decimal fixed-point scale; a value
/// below `HEALTH_FACTOR_ONE` marks the position liquidatable.
#[derive(Debug, Clone, Serialize)]
pub struct PositionSnapshot {
    pub borrower: Address,
    pub debt_asset: Token,
    pub debt_amount: U256,
    pub health_factor: U256,
}

impl PositionSnapshot {
    pub fn is_liquidatable(&self) -> bool {
        self.health_factor < HEALTH_FACTOR_ONE
    }

    /// Health factor as a display ratio (1.0 = at the liquidation boundary).
    pub fn health_factor_ratio(&self) -> Option<Decimal> {
        u256_to_decimal(self.health_factor, 18)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(health_factor: U256) -> PositionSnapshot {
        PositionSnapshot {
            borrower: Address::ZERO,
            debt_asset: Token::Usdc,
            debt_amount: U256::from(1_000_000_000u64),
            health_factor,
        }
    }

    #[test]
    fn below_one_is_liquidatable() {
        // 0.95 in 18-decimal fixed point
        let s = snapshot(U256::from(950_000_000_000_000_000u64));
        assert!(s.is_liquidatable());
        assert_eq!(s.health_factor_ratio().unwrap(), dec!(0.95));
    }

    #[test]
    fn at_or_above_one_is_healthy() {
        assert!(!snapshot(HEALTH_FACTOR_ONE).is_liquidatable());
        assert!(!snapshot(U256::from(2_000_000_000_000_000_000u64)).is_liquidatable());
    }
}
