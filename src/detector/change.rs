//! Value change evaluators: relative (%) and absolute deltas

use std::collections::BTreeMap;

use super::evaluator::{mismatched_state, tracked_records, Evaluation, Evaluator};
use crate::errors::MonitorResult;
use crate::types::{ChangeEvent, EntityRecord, MonitorConfig, MonitorFamily, PollState, Snapshot};

/// Percent change relative to the previous value; undefined unless `previous > 0`.
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    (previous > 0.0).then(|| (current - previous) / previous * 100.0)
}

fn previous_values<'a>(
    config: &MonitorConfig,
    previous: Option<&'a PollState>,
) -> Option<&'a BTreeMap<String, f64>> {
    match previous {
        Some(PollState::Values(values)) => Some(values),
        Some(other) => {
            mismatched_state(config, other, "values");
            None
        }
        None => None,
    }
}

/// Emits when `|change%| >= threshold`. Handles both entity collections and
/// single-value sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentChangeEvaluator;

impl Evaluator for PercentChangeEvaluator {
    fn family(&self) -> MonitorFamily {
        MonitorFamily::PercentChange
    }

    fn evaluate(
        &self,
        config: &MonitorConfig,
        previous: Option<&PollState>,
        snapshot: &Snapshot,
    ) -> MonitorResult<Evaluation> {
        let threshold = config.threshold();

        let records = match snapshot {
            Snapshot::Scalar(current) => {
                let previous = match previous {
                    Some(PollState::Scalar(value)) => Some(*value),
                    Some(other) => {
                        mismatched_state(config, other, "scalar");
                        None
                    }
                    None => None,
                };

                let events = previous
                    .and_then(|prev| percent_change(prev, *current).map(|change| (prev, change)))
                    .filter(|(_, change)| change.abs() >= threshold)
                    .map(|(prev, change)| {
                        ChangeEvent::new(config, *current)
                            .with_previous(prev)
                            .with_change_percent(change)
                    })
                    .into_iter()
                    .collect();

                return Ok(Evaluation::new(events, PollState::Scalar(*current)));
            }
            Snapshot::Entities(records) => records,
        };

        let previous = previous_values(config, previous);
        let mut events = Vec::new();
        let mut current = BTreeMap::new();

        for record in tracked_records(config, records) {
            current.insert(record.id.clone(), record.value);

            let Some(prev) = previous.and_then(|values| values.get(&record.id)).copied() else {
                continue;
            };
            if let Some(change) = percent_change(prev, record.value) {
                if change.abs() >= threshold {
                    events.push(
                        ChangeEvent::for_entity(config, record)
                            .with_previous(prev)
                            .with_change_percent(change),
                    );
                }
            }
        }

        Ok(Evaluation::new(events, PollState::Values(current)))
    }
}

/// Emits when `|current - previous| >= threshold`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteChangeEvaluator;

impl Evaluator for AbsoluteChangeEvaluator {
    fn family(&self) -> MonitorFamily {
        MonitorFamily::AbsoluteChange
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
        let threshold = config.threshold();
        let previous = previous_values(config, previous);
        let mut events = Vec::new();
        let mut current = BTreeMap::new();

        for record in tracked_records(config, records) {
            current.insert(record.id.clone(), record.value);

            if let Some(prev) = previous.and_then(|values| values.get(&record.id)).copied() {
                let change = record.value - prev;
                if change.abs() >= threshold {
                    events.push(
                        ChangeEvent::for_entity(config, record)
                            .with_previous(prev)
                            .with_change_absolute(change),
                    );
                }
            }
        }

        Ok(Evaluation::new(events, PollState::Values(current)))
    }
}
