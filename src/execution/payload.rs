//! Transaction payload encoding

use alloy::primitives::{keccak256, Address, U256};

/// Default V3 pool fee tier used for the liquidation swap leg (0.3%).
pub const LIQUIDATION_POOL_FEE: u32 = 3000;

fn push_address(encoded: &mut Vec<u8>, addr: Address) {
    encoded.extend_from_slice(&[0u8; 12]);
    encoded.extend_from_slice(addr.as_slice());
}

fn push_u256(encoded: &mut Vec<u8>, value: U256) {
    encoded.extend_from_slice(&value.to_be_bytes::<32>());
}

/// `requestFlashLoan(address,uint256,address,address,address)`: borrow
/// `amount` of `token`, swap through `router_a` into `token_b`, back through
/// `router_b`, repay the loan and keep the difference.
pub fn encode_request_flash_loan(
    token: Address,
    amount: U256,
    router_a: Address,
    router_b: Address,
    token_b: Address,
) -> Vec<u8> {
    let mut encoded =
        keccak256("requestFlashLoan(address,uint256,address,address,address)")[..4].to_vec();
    push_address(&mut encoded, token);
    push_u256(&mut encoded, amount);
    push_address(&mut encoded, router_a);
    push_address(&mut encoded, router_b);
    push_address(&mut encoded, token_b);
    encoded
}

/// `requestLiquidation(address,address,address,uint256,uint24,uint256)`:
/// flash-borrow the debt asset, repay the borrower's debt, seize collateral,
/// swap it back through the given fee tier, and enforce `amount_out_min`.
pub fn encode_request_liquidation(
    borrower: Address,
    debt_asset: Address,
    collateral_asset: Address,
    debt_amount: U256,
    pool_fee: u32,
    amount_out_min: U256,
) -> Vec<u8> {
    let mut encoded =
        keccak256("requestLiquidation(address,address,address,uint256,uint24,uint256)")[..4]
            .to_vec();
    push_address(&mut encoded, borrower);
    push_address(&mut encoded, debt_asset);
    push_address(&mut encoded, collateral_asset);
    push_u256(&mut encoded, debt_amount);
    push_u256(&mut encoded, U256::from(pool_fee));
    push_u256(&mut encoded, amount_out_min);
    encoded
}

/// Minimum acceptable output once the slippage tolerance is applied.
pub fn min_output_after_slippage(expected: U256, slippage_bps: u32) -> U256 {
    expected * U256::from(10_000 - slippage_bps as u64) / U256::from(10_000)
}

/// The flash-loan premium that must come back on top of the principal.
pub fn loan_premium(amount: U256, fee_bps: u32) -> U256 {
    amount * U256::from(fee_bps) / U256::from(10_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QUICKSWAP_ROUTER, SUSHISWAP_ROUTER, USDC, WETH};

    #[test]
    fn flash_loan_calldata_layout() {
        let amount = U256::from(10_000_000u64); // 10 USDC
        let encoded = encode_request_flash_loan(
            USDC,
            amount,
            QUICKSWAP_ROUTER,
            SUSHISWAP_ROUTER,
            WETH,
        );

        assert_eq!(encoded.len(), 4 + 32 * 5);
        assert_eq!(
            &encoded[..4],
            &keccak256("requestFlashLoan(address,uint256,address,address,address)")[..4]
        );
        assert_eq!(&encoded[16..36], USDC.as_slice());
        assert_eq!(U256::from_be_slice(&encoded[36..68]), amount);
        assert_eq!(&encoded[80..100], QUICKSWAP_ROUTER.as_slice());
        assert_eq!(&encoded[112..132], SUSHISWAP_ROUTER.as_slice());
        assert_eq!(&encoded[144..164], WETH.as_slice());
    }

    #[test]
    fn liquidation_calldata_layout() {
        let borrower = Address::repeat_byte(0x42);
        let debt_amount = U256::from(1_000_000_000u64);
        let min_out = U256::from(1_000_900_000u64);
        let encoded = encode_request_liquidation(
            borrower,
            USDC,
            WETH,
            debt_amount,
            LIQUIDATION_POOL_FEE,
            min_out,
        );

        assert_eq!(encoded.len(), 4 + 32 * 6);
        assert_eq!(
            &encoded[..4],
            &keccak256("requestLiquidation(address,address,address,uint256,uint24,uint256)")[..4]
        );
        assert_eq!(&encoded[16..36], borrower.as_slice());
        // uint24 still occupies a full word
        assert_eq!(
            U256::from_be_slice(&encoded[4 + 32 * 4..4 + 32 * 5]),
            U256::from(3000u64)
        );
        assert_eq!(U256::from_be_slice(&encoded[4 + 32 * 5..]), min_out);
    }

    #[test]
    fn slippage_reduces_expected_output() {
        // 30 bps off 1_000_000 leaves 997_000
        assert_eq!(
            min_output_after_slippage(U256::from(1_000_000u64), 30),
            U256::from(997_000u64)
        );
        // zero tolerance passes the quote through
        assert_eq!(
            min_output_after_slippage(U256::from(1_000_000u64), 0),
            U256::from(1_000_000u64)
        );
    }

    #[test]
    fn premium_is_nine_bps_of_principal() {
        // Aave flash-loan premium at 0.09%
        assert_eq!(
            loan_premium(U256::from(1_000_000_000u64), 9),
            U256::from(900_000u64)
        );
    }
}
