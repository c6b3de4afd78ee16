//! Market data aggregation

pub mod snapshot;

pub use snapshot::*;
