//! Polyflash Bot - Flash-loan arbitrage and Aave V3 liquidation bot for Polygon
//!
//! Scans QuickSwap/SushiSwap spreads and Aave V3 borrow activity for
//! profitable opportunities, pushes each candidate through an ordered
//! profitability-and-risk gate chain, and executes through a mandatory
//! simulate-before-send discipline.

pub mod config;
pub mod detector;
pub mod errors;
pub mod evaluator;
pub mod execution;
pub mod market;
pub mod network;
pub mod storage;
pub mod tracker;
pub mod types;
pub mod utils;
pub mod venues;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{BotError, BotResult};
pub use types::*;

// Type alias for our concrete provider
pub type ConcreteProvider = alloy::providers::RootProvider<alloy::transports::BoxTransport>;
