//! Poll state store contract

use crate::errors::MonitorResult;
use crate::types::PollState;

/// Durable backing for per-instance poll state.
///
/// Whatever was last `set` for a key is returned by the next `get`; an
/// unknown key is `Ok(None)`, never an error.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> MonitorResult<Option<PollState>>;

    fn set(&self, key: &str, state: PollState) -> MonitorResult<()>;
}

impl<S: StateStore + ?Sized> StateStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> MonitorResult<Option<PollState>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, state: PollState) -> MonitorResult<()> {
        (**self).set(key, state)
    }
}
