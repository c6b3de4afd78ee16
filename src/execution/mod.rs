//! Transaction building, simulation and submission

pub mod engine;
pub mod payload;

pub use engine::*;
pub use payload::*;
