//! Curve API access: endpoint templates, rate-limit retry and the resilient client

pub mod endpoints;
pub mod retry;
pub mod client;

pub use endpoints::*;
pub use retry::*;
pub use client::*;
