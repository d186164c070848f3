//! In-memory record of every dispatched request, for debugging tools.
//!
//! The ledger is observational only: nothing in the request path reads it back, and no
//! operation on it can fail a request.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use jiff::Timestamp;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Correlation id shared by the ledger entry and the `X-Request-ID` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        RequestId(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Clone, Debug, Serialize)]
pub struct LedgerEntry {
    pub id: RequestId,
    pub url: String,
    pub method: String,
    pub status: LedgerStatus,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

struct LedgerInner {
    entries: HashMap<RequestId, LedgerEntry>,
    order: VecDeque<RequestId>,
}

pub struct RequestLedger {
    capacity: usize,
    inner: Mutex<LedgerInner>,
}

impl RequestLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(LedgerInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Registers a new pending entry, evicting the oldest one when the ledger is full.
    pub fn add_request(&self, method: &str, url: &str) -> RequestId {
        let id = RequestId::new();
        let mut inner = self.lock();
        while inner.order.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(evicted) => {
                    inner.entries.remove(&evicted);
                }
                None => break,
            }
        }
        inner.entries.insert(
            id,
            LedgerEntry {
                id,
                url: url.to_string(),
                method: method.to_string(),
                status: LedgerStatus::Pending,
                status_code: None,
                error_message: None,
                started_at: Timestamp::now(),
                finished_at: None,
            },
        );
        inner.order.push_back(id);
        id
    }

    pub fn complete_request(&self, id: RequestId, status_code: u16) {
        self.finish(id, LedgerStatus::Completed, Some(status_code), None);
    }

    pub fn fail_request(&self, id: RequestId, message: &str) {
        self.finish(id, LedgerStatus::Failed, None, Some(message.to_string()));
    }

    pub fn get(&self, id: RequestId) -> Option<LedgerEntry> {
        self.lock().entries.get(&id).cloned()
    }

    /// Entries in the order they were added.
    pub fn snapshot(&self) -> Vec<LedgerEntry> {
        let inner = self.lock();
        inner
            .order
            .iter()
            .filter_map(|id| inner.entries.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn finish(
        &self,
        id: RequestId,
        status: LedgerStatus,
        status_code: Option<u16>,
        error_message: Option<String>,
    ) {
        let mut inner = self.lock();
        let Some(entry) = inner.entries.get_mut(&id) else {
            debug!(request_id = %id, "ledger.unknown_entry");
            return;
        };
        if entry.status != LedgerStatus::Pending {
            debug!(request_id = %id, current = ?entry.status, "ledger.already_terminal");
            return;
        }
        entry.status = status;
        entry.status_code = status_code;
        entry.error_message = error_message;
        entry.finished_at = Some(Timestamp::now());
    }

    // Poisoning is ignored: entries stay readable and writable.
    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RequestLedger {
    fn default() -> Self {
        Self::new(500)
    }
}
