//! Error types and failure handling for the poll host

pub mod monitor_error;
pub mod circuit_breaker;

pub use monitor_error::*;
pub use circuit_breaker::*;
