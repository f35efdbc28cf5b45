//! Data persistence and file operations

pub mod events;

pub use events::*;
