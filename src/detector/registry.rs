//! Monitor type → evaluator table

use std::collections::HashMap;
use std::sync::Arc;

use super::change::{AbsoluteChangeEvaluator, PercentChangeEvaluator};
use super::crossing::ThresholdCrossingEvaluator;
use super::evaluator::Evaluator;
use super::new_entity::NewEntityEvaluator;
use crate::errors::{MonitorError, MonitorResult};
use crate::types::{MonitorFamily, MonitorType};

pub fn evaluator_for_family(family: MonitorFamily) -> Arc<dyn Evaluator> {
    match family {
        MonitorFamily::PercentChange => Arc::new(PercentChangeEvaluator),
        MonitorFamily::AbsoluteChange => Arc::new(AbsoluteChangeEvaluator),
        MonitorFamily::ThresholdCrossing => Arc::new(ThresholdCrossingEvaluator),
        MonitorFamily::NewEntity => Arc::new(NewEntityEvaluator),
    }
}

/// Adding a monitor type is a `register` call, not a new match arm in the poller.
#[derive(Clone, Default)]
pub struct EvaluatorRegistry {
    evaluators: HashMap<MonitorType, Arc<dyn Evaluator>>,
}

impl EvaluatorRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers every built-in monitor type with its family's evaluator.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for monitor_type in MonitorType::ALL {
            registry.register(monitor_type, evaluator_for_family(monitor_type.family()));
        }
        registry
    }

    /// Returns the evaluator previously registered for `monitor_type`, if any.
    pub fn register(
        &mut self,
        monitor_type: MonitorType,
        evaluator: Arc<dyn Evaluator>,
    ) -> Option<Arc<dyn Evaluator>> {
        self.evaluators.insert(monitor_type, evaluator)
    }

    pub fn get(&self, monitor_type: MonitorType) -> MonitorResult<Arc<dyn Evaluator>> {
        self.evaluators
            .get(&monitor_type)
            .cloned()
            .ok_or_else(|| MonitorError::UnknownMonitorType(monitor_type.to_string()))
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_type_with_matching_family() {
        let registry = EvaluatorRegistry::with_defaults();
        assert_eq!(registry.len(), MonitorType::ALL.len());
        for monitor_type in MonitorType::ALL {
            let evaluator = registry.get(monitor_type).unwrap();
            assert_eq!(evaluator.family(), monitor_type.family());
        }
    }

    #[test]
    fn unregistered_type_is_unknown() {
        let registry = EvaluatorRegistry::empty();
        let err = registry.get(MonitorType::NewGaugeCreated).err().unwrap();
        assert!(matches!(err, MonitorError::UnknownMonitorType(name) if name == "newGaugeCreated"));
    }
}
