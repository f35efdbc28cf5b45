//! Change detection: one evaluator per comparison family, registered per monitor type

pub mod evaluator;
pub mod change;
pub mod crossing;
pub mod new_entity;
pub mod registry;

pub use evaluator::*;
pub use change::*;
pub use crossing::*;
pub use new_entity::*;
pub use registry::*;
