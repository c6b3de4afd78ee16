//! Core data types and structures

pub mod addresses;
pub mod decision;
pub mod execution;
pub mod opportunity;
pub mod position;
pub mod quote;
pub mod venue;

pub use addresses::*;
pub use decision::*;
pub use execution::*;
pub use opportunity::*;
pub use position::*;
pub use quote::*;
pub use venue::*;
