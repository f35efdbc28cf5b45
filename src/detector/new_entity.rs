//! New entity detection by identity-set difference

use std::collections::BTreeSet;

use super::evaluator::{mismatched_state, tracked_records, Evaluation, Evaluator};
use crate::errors::MonitorResult;
use crate::types::{ChangeEvent, EntityRecord, MonitorConfig, MonitorFamily, PollState, Snapshot};

/// Emits one event per identity absent from the previous set. An empty
/// previous set is treated like no baseline, so an initially empty source
/// does not flood events once it fills.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewEntityEvaluator;

impl Evaluator for NewEntityEvaluator {
    fn family(&self) -> MonitorFamily {
        MonitorFamily::NewEntity
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
            Some(PollState::Identities(ids)) if !ids.is_empty() => Some(ids),
            Some(PollState::Identities(_)) | None => None,
            Some(other) => {
                mismatched_state(config, other, "identities");
                None
            }
        };

        let mut events = Vec::new();
        let mut current = BTreeSet::new();

        for record in tracked_records(config, records) {
            // insert() is false for duplicates within the same snapshot
            let first_sighting = current.insert(record.id.clone());
            if let Some(previous) = previous {
                if first_sighting && !previous.contains(&record.id) {
                    events.push(ChangeEvent::for_entity(config, record));
                }
            }
        }

        Ok(Evaluation::new(events, PollState::Identities(current)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MonitorType;

    fn observed(ids: &[&str]) -> Snapshot {
        Snapshot::Entities(ids.iter().map(|id| EntityRecord::new(*id, 0.0)).collect())
    }

    fn config() -> MonitorConfig {
        MonitorConfig::new(MonitorType::NewPoolCreated, "ethereum")
    }

    #[test]
    fn reports_only_new_identities() {
        let cycle1 = NewEntityEvaluator.evaluate(&config(), None, &observed(&["A", "B"])).unwrap();
        assert!(cycle1.events.is_empty());
        assert_eq!(
            cycle1.state,
            PollState::Identities(BTreeSet::from(["A".to_string(), "B".to_string()]))
        );

        let cycle2 = NewEntityEvaluator
            .evaluate(&config(), Some(&cycle1.state), &observed(&["A", "B", "C"]))
            .unwrap();
        assert_eq!(cycle2.events.len(), 1);
        assert_eq!(cycle2.events[0].entity_id.as_deref(), Some("C"));
        assert_eq!(cycle2.state.tracked(), 3);
    }

    #[test]
    fn empty_previous_set_suppresses_flood() {
        let empty = PollState::Identities(BTreeSet::new());
        let result = NewEntityEvaluator
            .evaluate(&config(), Some(&empty), &observed(&["A", "B"]))
            .unwrap();
        assert!(result.events.is_empty());
        assert_eq!(result.state.tracked(), 2);
    }

    #[test]
    fn removed_identities_are_forgotten() {
        let previous = PollState::Identities(BTreeSet::from(["A".to_string(), "B".to_string()]));
        let result = NewEntityEvaluator
            .evaluate(&config(), Some(&previous), &observed(&["B", "D", "D"]))
            .unwrap();
        assert_eq!(result.events.len(), 1);
        assert_eq!(
            result.state,
            PollState::Identities(BTreeSet::from(["B".to_string(), "D".to_string()]))
        );
    }
}
