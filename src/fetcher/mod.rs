//! Snapshot fetching: monitor type → endpoint → decoded entity collection

pub mod bindings;
pub mod extract;
pub mod snapshot;

pub use bindings::*;
pub use extract::*;
pub use snapshot::*;
