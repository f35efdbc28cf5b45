//! Startup notice that is logged at most once per owner

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

pub const DEFAULT_NOTICE: &str = "Curve monitor polls the public Curve Finance API read-only. \
Reported values are only as accurate as the upstream data source.";

/// Owned by the host and passed where needed; the flag lives in the value,
/// not in process-wide state.
#[derive(Debug)]
pub struct StartupNotice {
    message: String,
    logged: AtomicBool,
}

impl StartupNotice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            logged: AtomicBool::new(false),
        }
    }

    /// Logs the notice on the first call. Returns whether this call logged it.
    pub fn emit(&self) -> bool {
        if self.logged.swap(true, Ordering::SeqCst) {
            return false;
        }
        warn!("{}", self.message);
        true
    }

    pub fn was_logged(&self) -> bool {
        self.logged.load(Ordering::SeqCst)
    }
}

impl Default for StartupNotice {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_only_once_per_instance() {
        let notice = StartupNotice::default();
        assert!(!notice.was_logged());
        assert!(notice.emit());
        assert!(!notice.emit());
        assert!(notice.was_logged());

        // Independent owners do not share the flag.
        assert!(StartupNotice::new("other").emit());
    }
}
