//! Utility functions and helpers

pub mod logging;
pub mod display;
pub mod notice;

pub use logging::*;
pub use display::*;
pub use notice::*;
