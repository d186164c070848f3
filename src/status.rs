//! One-way signals for the UI layer.

use std::sync::Mutex;

use tracing::{error, info, warn};

/// Global error / status channel consumed by UI layers. The gateway only writes to it.
pub trait StatusSink: Send + Sync {
    fn set_global_error(&self, message: &str);
    fn set_auth_error(&self, message: &str);
    fn set_offline_status(&self, offline: bool);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub global_error: Option<String>,
    pub auth_error: Option<String>,
    pub offline: bool,
}

/// Keeps the latest value of each signal for a UI layer to poll.
#[derive(Default)]
pub struct StatusBoard {
    state: Mutex<StatusSnapshot>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.update(|state| state.clone())
    }

    fn update<T>(&self, f: impl FnOnce(&mut StatusSnapshot) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut state)
    }
}

impl StatusSink for StatusBoard {
    fn set_global_error(&self, message: &str) {
        error!(message, "status.global_error");
        self.update(|state| state.global_error = Some(message.to_string()));
    }

    fn set_auth_error(&self, message: &str) {
        warn!(message, "status.auth_error");
        self.update(|state| state.auth_error = Some(message.to_string()));
    }

    fn set_offline_status(&self, offline: bool) {
        let changed = self.update(|state| {
            let changed = state.offline != offline;
            state.offline = offline;
            changed
        });
        if changed {
            info!(offline, "status.offline");
        }
    }
}
