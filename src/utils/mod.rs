//! Utility functions and helpers

pub mod display;
pub mod health;
pub mod logging;
pub mod math;

pub use display::*;
pub use health::*;
pub use logging::*;
pub use math::*;
