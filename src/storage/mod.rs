//! Data persistence and file operations

pub mod decisions;
pub mod executions;

pub use decisions::*;
pub use executions::*;
