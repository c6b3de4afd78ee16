//! UniswapV2-style router quoting

use alloy::primitives::{keccak256, Address, U256};
use alloy::sol_types::SolValue;

use crate::errors::{BotError, BotResult};
use crate::network::ChainClient;
use crate::types::{Quote, Token, Venue};

/// ABI-encode `getAmountsOut(uint256,address[])`.
pub fn encode_get_amounts_out(amount_in: U256, path: &[Address]) -> Vec<u8> {
    let mut encoded = keccak256("getAmountsOut(uint256,address[])")[..4].to_vec();

    encoded.extend_from_slice(&amount_in.to_be_bytes::<32>());
    // offset of the dynamic array: two head words
    encoded.extend_from_slice(&U256::from(64).to_be_bytes::<32>());
    encoded.extend_from_slice(&U256::from(path.len()).to_be_bytes::<32>());
    for addr in path {
        encoded.extend_from_slice(&[0u8; 12]);
        encoded.extend_from_slice(addr.as_slice());
    }

    encoded
}

/// Ask an on-chain router how much `token_out` a swap of `amount_in`
/// `token_in` yields. A zero or missing output is malformed, not a price.
pub async fn quote_router(
    chain: &ChainClient,
    venue: Venue,
    token_in: Token,
    token_out: Token,
    amount_in: U256,
) -> BotResult<Quote> {
    let router = venue
        .router()
        .ok_or_else(|| BotError::malformed(format!("{venue} has no on-chain router")))?;

    let path = [token_in.address(), token_out.address()];
    let calldata = encode_get_amounts_out(amount_in, &path);
    let raw = chain.read(router, calldata).await?;

    let amounts = <Vec<U256>>::abi_decode(&raw, true).map_err(|e| BotError::Contract {
        contract: router,
        message: format!("getAmountsOut decode failed: {e}"),
        source: anyhow::anyhow!("{e}"),
    })?;

    let amount_out = amounts.last().copied().unwrap_or_default();
    if amount_out.is_zero() {
        return Err(BotError::malformed(format!(
            "{venue} returned zero output for {}->{}",
            token_in.symbol(),
            token_out.symbol()
        )));
    }

    Ok(Quote::new(venue, token_in, token_out, amount_in, amount_out))
}
