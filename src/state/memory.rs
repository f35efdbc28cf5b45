//! In-memory state store

use parking_lot::RwLock;
use std::collections::HashMap;

use super::store::StateStore;
use crate::errors::MonitorResult;
use crate::types::PollState;

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: RwLock<HashMap<String, PollState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> MonitorResult<Option<PollState>> {
        Ok(self.states.read().get(key).cloned())
    }

    fn set(&self, key: &str, state: PollState) -> MonitorResult<()> {
        self.states.write().insert(key.to_string(), state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_then_last_write_wins() {
        let store = MemoryStateStore::new();
        assert_eq!(store.get("poolTvlChanged:ethereum:main:*").unwrap(), None);

        store.set("poolTvlChanged:ethereum:main:*", PollState::Scalar(1.0)).unwrap();
        store.set("poolTvlChanged:ethereum:main:*", PollState::Scalar(2.0)).unwrap();
        assert_eq!(
            store.get("poolTvlChanged:ethereum:main:*").unwrap(),
            Some(PollState::Scalar(2.0))
        );
        assert_eq!(store.len(), 1);
    }
}
