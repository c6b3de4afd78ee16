//! Venue definitions

use alloy::primitives::Address;

use super::addresses::{QUICKSWAP_ROUTER, SUSHISWAP_ROUTER};

/// A price/liquidity source. A closed set by design: quoting code matches on
/// the variant instead of dispatching over arbitrary venue objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Venue {
    QuickSwap,
    SushiSwap,
    OneInch,
}

impl Venue {
    pub const fn name(&self) -> &'static str {
        match self {
            Venue::QuickSwap => "QuickSwap",
            Venue::SushiSwap => "SushiSwap",
            Venue::OneInch => "1inch",
        }
    }

    /// Router address for on-chain venues; the aggregator is quoted over HTTP.
    pub const fn router(&self) -> Option<Address> {
        match self {
            Venue::QuickSwap => Some(QUICKSWAP_ROUTER),
            Venue::SushiSwap => Some(SUSHISWAP_ROUTER),
            Venue::OneInch => None,
        }
    }

    pub const fn is_onchain(&self) -> bool {
        self.router().is_some()
    }
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
