//! Persisted poll state, one variant per comparison strategy

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// State carried from one poll cycle to the next. Each cycle replaces it
/// wholesale; entities missing from the latest snapshot are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PollState {
    Scalar(f64),
    Values(BTreeMap<String, f64>),
    Latches(BTreeMap<String, bool>),
    Identities(BTreeSet<String>),
}

impl PollState {
    pub fn kind(&self) -> &'static str {
        match self {
            PollState::Scalar(_) => "scalar",
            PollState::Values(_) => "values",
            PollState::Latches(_) => "latches",
            PollState::Identities(_) => "identities",
        }
    }

    /// Number of tracked entities (1 for a scalar).
    pub fn tracked(&self) -> usize {
        match self {
            PollState::Scalar(_) => 1,
            PollState::Values(values) => values.len(),
            PollState::Latches(latches) => latches.len(),
            PollState::Identities(ids) => ids.len(),
        }
    }
}
