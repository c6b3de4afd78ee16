//! Polygon token and contract address book

use alloy::primitives::{address, b256, Address, B256};

pub const CHAIN_ID_POLYGON: u64 = 137;

// Aave V3 pool on Polygon
pub const AAVE_V3_POOL: Address = address!("794a61358D6845594F94dc1DB02A252b5b4814aD");

// keccak256("Borrow(address,address,address,uint256,uint8,uint256,uint16)")
pub const BORROW_EVENT_TOPIC: B256 =
    b256!("b3d084820fb1a9decffb176436bd02558d15fac9b0ddfed8c465bc7359d7dce0");

// UniswapV2-style routers
pub const QUICKSWAP_ROUTER: Address = address!("a5E0829CaCEd8fFDD4De3c43696c57F7D7A678ff");
pub const SUSHISWAP_ROUTER: Address = address!("1b02dA8Cb0d097eB8D57A175b88c7D8b47997506");

// Token addresses (Polygon mainnet)
pub const USDC: Address = address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
pub const USDT: Address = address!("c2132D05D31c914a87C6611C10748AEb04B58e8F");
pub const DAI: Address = address!("8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063");
pub const WMATIC: Address = address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270");
pub const WETH: Address = address!("7ceB23fD6bC0adD59E62ac25578270cFf1b9f619");
pub const WBTC: Address = address!("1BFD67037B42Cf73acF2047067bd4F2C47D9BfD6");

/// Tokens the bot understands. A fixed set rather than arbitrary addresses:
/// borrow events outside this set are ignored as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Token {
    Usdc,
    Usdt,
    Dai,
    Wmatic,
    Weth,
    Wbtc,
}

impl Token {
    pub const ALL: [Token; 6] = [
        Token::Usdc,
        Token::Usdt,
        Token::Dai,
        Token::Wmatic,
        Token::Weth,
        Token::Wbtc,
    ];

    pub const fn address(&self) -> Address {
        match self {
            Token::Usdc => USDC,
            Token::Usdt => USDT,
            Token::Dai => DAI,
            Token::Wmatic => WMATIC,
            Token::Weth => WETH,
            Token::Wbtc => WBTC,
        }
    }

    pub const fn decimals(&self) -> u8 {
        match self {
            Token::Usdc | Token::Usdt => 6,
            Token::Dai | Token::Wmatic | Token::Weth => 18,
            Token::Wbtc => 8,
        }
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Token::Usdc => "USDC",
            Token::Usdt => "USDT",
            Token::Dai => "DAI",
            Token::Wmatic => "WMATIC",
            Token::Weth => "WETH",
            Token::Wbtc => "WBTC",
        }
    }

    pub fn from_address(addr: Address) -> Option<Token> {
        Token::ALL.into_iter().find(|t| t.address() == addr)
    }

    pub const fn is_stablecoin(&self) -> bool {
        matches!(self, Token::Usdc | Token::Usdt | Token::Dai)
    }

    /// Collateral assets worth seizing when this token is the debt asset.
    /// Order matters: ties in estimated profit go to the first entry.
    pub const fn collateral_candidates(&self) -> &'static [Token] {
        match self {
            Token::Usdc | Token::Usdt => &[Token::Weth, Token::Wmatic, Token::Wbtc],
            Token::Weth | Token::Wmatic => &[Token::Usdc, Token::Usdt],
            Token::Dai => &[Token::Usdc, Token::Usdt, Token::Weth, Token::Wmatic],
            Token::Wbtc => &[Token::Usdc, Token::Usdt],
        }
    }
}
