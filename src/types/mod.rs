//! Core data types and structures

pub mod chains;
pub mod monitor;
pub mod snapshot;
pub mod state;
pub mod event;

pub use chains::*;
pub use monitor::*;
pub use snapshot::*;
pub use state::*;
pub use event::*;
