//! Poll cycle orchestration

pub mod cycle;

pub use cycle::*;
