//! Poll state persistence keyed by monitor instance

pub mod store;
pub mod memory;
pub mod file;

pub use store::*;
pub use memory::*;
pub use file::*;
