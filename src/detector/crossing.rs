//! Upward threshold crossing with a per-entity latch

use std::collections::BTreeMap;

use super::evaluator::{mismatched_state, tracked_records, Evaluation, Evaluator};
use crate::errors::MonitorResult;
use crate::types::{ChangeEvent, EntityRecord, MonitorConfig, MonitorFamily, PollState, Snapshot};

/// Latches `value >= threshold` per entity and emits only on a false → true
/// flip. Staying above, or dropping back below, emits nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdCrossingEvaluator;

impl Evaluator for ThresholdCrossingEvaluator {
    fn family(&self) -> MonitorFamily {
        MonitorFamily::ThresholdCrossing
    }

    fn evaluate(
        &self,
        config: &MonitorConfig,
        previous: Option<&PollState>,
        snapshot: &Snapshot,
    ) -> MonitorResult<Evaluation> {
        let records: &[EntityRecord] = match snapshot {
            Snapshot::Entities(records) => records,
            Snapshot::Scalar(_) => &[],
        };
        let previous = match previous {
            Some(PollState::Latches(latches)) => Some(latches),
            Some(other) => {
                mismatched_state(config, other, "latches");
                None
            }
            None => None,
        };

        let threshold = config.threshold();
        let mut events = Vec::new();
        let mut latches = BTreeMap::new();

        for record in tracked_records(config, records) {
            let above = record.value >= threshold;
            latches.insert(record.id.clone(), above);

            let Some(previous) = previous else { continue };
            let was_above = previous.get(&record.id).copied().unwrap_or(false);
            if above && !was_above {
                events.push(ChangeEvent::for_entity(config, record));
            }
        }

        Ok(Evaluation::new(events, PollState::Latches(latches)))
    }
}
