//! Curve Monitor - polling change detection over the Curve Finance API
//!
//! Each monitor instance periodically fetches a snapshot (pools, gauges,
//! lending vaults, crvUSD supply), compares it with the state persisted by
//! the previous poll and emits change events for percentage moves, absolute
//! moves, upward threshold crossings and newly appearing entities.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod fetcher;
pub mod detector;
pub mod state;
pub mod poller;
pub mod storage;
pub mod utils;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{MonitorError, MonitorResult};
pub use types::*;
pub use network::{CurveApiClient, RetryPolicy};
pub use fetcher::{SnapshotFetcher, SnapshotSource};
pub use detector::{Evaluation, Evaluator, EvaluatorRegistry};
pub use state::{JsonFileStateStore, MemoryStateStore, StateStore};
pub use poller::Poller;
