use std::time::SystemTime;

use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::RefreshFailure;

#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    context: String,
}

impl RefreshTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context: context.into(),
        }
    }

    pub fn emit_start(&self, at: SystemTime) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = ?at,
            "refresh.start"
        );
    }

    pub fn emit_success(&self, generation: u64, waiters: usize, at: SystemTime) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = ?at,
            generation,
            waiters,
            "refresh.success"
        );
    }

    pub fn emit_queued(&self, depth: usize) {
        event!(
            Level::DEBUG,
            attempt_id = %self.attempt_id,
            context = %self.context,
            depth,
            "refresh.queued"
        );
    }

    pub fn emit_failure(&self, failure: &RefreshFailure, waiters: usize, at: SystemTime) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = ?at,
            waiters,
            error = %failure,
            "refresh.failure"
        );
    }
}
