//! The evaluate capability shared by every monitor family

use tracing::warn;

use crate::errors::MonitorResult;
use crate::types::{ChangeEvent, EntityRecord, MonitorConfig, MonitorFamily, PollState, Snapshot};

/// Output of one evaluation: events to emit and the state to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub events: Vec<ChangeEvent>,
    pub state: PollState,
}

impl Evaluation {
    pub fn new(events: Vec<ChangeEvent>, state: PollState) -> Self {
        Self { events, state }
    }
}

pub trait Evaluator: Send + Sync {
    fn family(&self) -> MonitorFamily;

    /// Compares `snapshot` against `previous`.
    ///
    /// With no previous state nothing is emitted and the returned state is
    /// the baseline. The returned state always covers the full (filtered)
    /// snapshot, whether or not events fired.
    fn evaluate(
        &self,
        config: &MonitorConfig,
        previous: Option<&PollState>,
        snapshot: &Snapshot,
    ) -> MonitorResult<Evaluation>;
}

/// Records that pass the monitor's entity filter, in snapshot order.
pub fn tracked_records<'a>(
    config: &'a MonitorConfig,
    records: &'a [EntityRecord],
) -> impl Iterator<Item = &'a EntityRecord> + 'a {
    let filter = config.entity_filter();
    records.iter().filter(move |record| match filter {
        None => true,
        Some(filter) if filter.starts_with("0x") => record.id.eq_ignore_ascii_case(filter),
        Some(filter) => record.id == filter,
    })
}

/// Logs and drops a persisted state left behind by a different monitor family.
pub(crate) fn mismatched_state(config: &MonitorConfig, state: &PollState, expected: &str) {
    warn!(
        monitor_type = %config.monitor_type,
        found = state.kind(),
        expected,
        "Persisted state has the wrong shape, starting a new baseline"
    );
}
