//! JSON file state store, one file per monitor instance

use anyhow::Context;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::store::StateStore;
use crate::errors::{MonitorError, MonitorResult};
use crate::types::PollState;

#[derive(Debug, Clone)]
pub struct JsonFileStateStore {
    dir: PathBuf,
}

/// Maps an instance key to a file-safe name.
pub fn state_file_name(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();
    format!("{}.json", sanitized)
}

fn state_error(key: &str, message: &str, source: anyhow::Error) -> MonitorError {
    MonitorError::State {
        key: key.to_string(),
        message: message.to_string(),
        source: Some(source),
    }
}

impl JsonFileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> MonitorResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating {}", dir.display()))
            .map_err(|e| state_error("*", "cannot create state directory", e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(state_file_name(key))
    }
}

impl StateStore for JsonFileStateStore {
    fn get(&self, key: &str) -> MonitorResult<Option<PollState>> {
        let path = self.path_for(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(state_error(key, "cannot read state file", e.into())),
        };

        let state = serde_json::from_str(&contents)
            .map_err(|e| state_error(key, "state file is not valid JSON", e.into()))?;
        Ok(Some(state))
    }

    fn set(&self, key: &str, state: PollState) -> MonitorResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        let contents = serde_json::to_string_pretty(&state)
            .map_err(|e| state_error(key, "cannot serialize state", e.into()))?;
        fs::write(&tmp, contents).map_err(|e| state_error(key, "cannot write state file", e.into()))?;
        fs::rename(&tmp, &path).map_err(|e| state_error(key, "cannot replace state file", e.into()))?;

        debug!(key, kind = state.kind(), tracked = state.tracked(), "Persisted poll state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path().join("state")).unwrap();
        let key = "newGaugeCreated:ethereum:-:*";

        assert_eq!(store.get(key).unwrap(), None);

        let state = PollState::Identities(BTreeSet::from(["0xabc".to_string()]));
        store.set(key, state.clone()).unwrap();
        assert_eq!(store.get(key).unwrap(), Some(state));
        assert!(store.path_for(key).ends_with("newGaugeCreated_ethereum_-__.json"));

        // A second store over the same directory sees the persisted state.
        let reopened = JsonFileStateStore::new(store.dir()).unwrap();
        assert!(reopened.get(key).unwrap().is_some());
    }

    #[test]
    fn corrupt_file_is_a_state_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path()).unwrap();
        fs::write(store.path_for("k"), "{not json").unwrap();
        assert!(matches!(store.get("k"), Err(MonitorError::State { .. })));
    }
}
