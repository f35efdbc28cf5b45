//! One poll cycle: validate, fetch, evaluate, then commit state

use tracing::{debug, info};

use crate::detector::EvaluatorRegistry;
use crate::errors::MonitorResult;
use crate::fetcher::SnapshotSource;
use crate::state::StateStore;
use crate::types::{ChangeEvent, MonitorConfig};

/// Runs poll cycles for any number of monitor instances.
///
/// The host must not run overlapping cycles for the same instance; the
/// poller does no locking of its own.
pub struct Poller<S, St> {
    source: S,
    store: St,
    registry: EvaluatorRegistry,
}

impl<S: SnapshotSource, St: StateStore> Poller<S, St> {
    pub fn new(source: S, store: St) -> Self {
        Self::with_registry(source, store, EvaluatorRegistry::with_defaults())
    }

    pub fn with_registry(source: S, store: St, registry: EvaluatorRegistry) -> Self {
        Self { source, store, registry }
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs one cycle for `config` and returns the events it produced.
    ///
    /// State is written only after the fetch and the evaluation succeed; any
    /// error leaves the previously persisted state in place.
    pub async fn poll_once(&self, config: &MonitorConfig) -> MonitorResult<Vec<ChangeEvent>> {
        config.validate()?;
        let evaluator = self.registry.get(config.monitor_type)?;

        let key = config.instance_key();
        let previous = self.store.get(&key)?;
        let snapshot = self.source.fetch(config).await?;

        let evaluation = evaluator.evaluate(config, previous.as_ref(), &snapshot)?;

        if previous.is_none() {
            info!(
                monitor = %key,
                tracked = evaluation.state.tracked(),
                "Recorded baseline, no events on first poll"
            );
        } else {
            debug!(
                monitor = %key,
                records = snapshot.len(),
                events = evaluation.events.len(),
                "Poll cycle evaluated"
            );
        }

        self.store.set(&key, evaluation.state)?;
        Ok(evaluation.events)
    }
}
