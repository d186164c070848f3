use crate::ledger::RequestId;

/// Replays beyond this count always end the session.
pub const MAX_RETRY_COUNT: u8 = 2;

/// Retry state of one logical request. Replaying produces a new value; nothing is
/// mutated in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attempt {
    pub retry_count: u8,
    pub max_retry_count: u8,
    pub retried: bool,
}

impl Attempt {
    pub fn first() -> Self {
        Self {
            retry_count: 0,
            max_retry_count: MAX_RETRY_COUNT,
            retried: false,
        }
    }

    pub fn replay(self) -> Self {
        Self {
            retry_count: self.retry_count.saturating_add(1),
            max_retry_count: self.max_retry_count,
            retried: true,
        }
    }

    pub fn budget_exhausted(&self) -> bool {
        self.retry_count >= self.max_retry_count
    }
}

impl Default for Attempt {
    fn default() -> Self {
        Self::first()
    }
}

/// Everything the pipeline threads through one send: the correlation id, the retry
/// state, and the refresh generation of the token the request carries.
#[derive(Clone, Copy, Debug)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub attempt: Attempt,
    pub generation: u64,
}

impl RequestContext {
    pub fn new(request_id: RequestId, generation: u64) -> Self {
        Self {
            request_id,
            attempt: Attempt::first(),
            generation,
        }
    }

    /// Same request id, next attempt, carrying a token from `generation`.
    pub fn replay(self, generation: u64) -> Self {
        Self {
            request_id: self.request_id,
            attempt: self.attempt.replay(),
            generation,
        }
    }
}
