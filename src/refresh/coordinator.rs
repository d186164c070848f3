use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use tokio::sync::oneshot;
use tracing::{Level, debug, event};

use crate::errors::{AUTH_EXPIRED_MESSAGE, RefreshFailure};
use crate::status::StatusSink;
use crate::telemetry::refresh::RefreshTelemetry;
use crate::token::TokenStore;

type RefreshResult = Result<FreshToken, RefreshFailure>;

/// An access token produced by a refresh, tagged with the refresh generation that issued it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreshToken {
    pub value: String,
    pub generation: u64,
}

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    pending: VecDeque<oneshot::Sender<RefreshResult>>,
    generation: u64,
    latest: Option<String>,
    telemetry: Option<RefreshTelemetry>,
}

enum Entry {
    Reuse(FreshToken),
    Ended,
    Wait(oneshot::Receiver<RefreshResult>),
    Lead(RefreshTelemetry, u64),
}

/// Single-flight token refresh.
///
/// The first request to fail with an expired token becomes the leader and performs the
/// refresh; every other request failing while that refresh is in flight is queued and
/// settled in FIFO order with the leader's outcome.
pub struct RefreshCoordinator {
    store: Arc<dyn TokenStore>,
    status: Arc<dyn StatusSink>,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<dyn TokenStore>, status: Arc<dyn StatusSink>) -> Self {
        Self {
            store,
            status,
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// Session generation, bumped by every successful refresh and every forced logout.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Returns a token newer than the one issued at `seen_generation`, refreshing at most
    /// once no matter how many callers arrive concurrently. A caller whose session was
    /// ended by a logout after `seen_generation` gets [`RefreshFailure::SessionEnded`].
    pub async fn refreshed_token(&self, seen_generation: u64) -> RefreshResult {
        // Check-and-set happens under the lock with no await in between.
        let entry = {
            let mut state = self.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.pending.push_back(tx);
                if let Some(telemetry) = &state.telemetry {
                    telemetry.emit_queued(state.pending.len());
                }
                Entry::Wait(rx)
            } else if state.generation > seen_generation {
                match state.latest.clone() {
                    Some(value) => Entry::Reuse(FreshToken {
                        value,
                        generation: state.generation,
                    }),
                    None => Entry::Ended,
                }
            } else {
                let telemetry = RefreshTelemetry::new("gateway.refresh");
                state.refreshing = true;
                state.telemetry = Some(telemetry.clone());
                Entry::Lead(telemetry, state.generation)
            }
        };

        match entry {
            Entry::Reuse(token) => {
                debug!(generation = token.generation, "refresh.reused");
                Ok(token)
            }
            Entry::Ended => {
                debug!(seen_generation, "refresh.session_ended");
                Err(RefreshFailure::SessionEnded)
            }
            Entry::Wait(rx) => rx.await.unwrap_or(Err(RefreshFailure::Abandoned)),
            Entry::Lead(telemetry, started) => {
                let flight = InFlight {
                    coordinator: self,
                    started,
                    settled: false,
                };
                self.lead(flight, telemetry).await
            }
        }
    }

    async fn lead(&self, flight: InFlight<'_>, telemetry: RefreshTelemetry) -> RefreshResult {
        telemetry.emit_start(SystemTime::now());
        let outcome = self.run_refresh().await;
        match &outcome {
            Ok(value) => match flight.succeed(value.clone()) {
                Ok((token, waiters)) => {
                    telemetry.emit_success(token.generation, waiters, SystemTime::now());
                    Ok(token)
                }
                Err(waiters) => {
                    // The store may already hold the issued tokens.
                    self.remove_tokens().await;
                    let failure = RefreshFailure::SessionEnded;
                    telemetry.emit_failure(&failure, waiters, SystemTime::now());
                    Err(failure)
                }
            },
            Err(failure) => {
                self.force_logout(&failure.to_string()).await;
                let waiters = flight.fail(failure.clone());
                telemetry.emit_failure(failure, waiters, SystemTime::now());
                Err(failure.clone())
            }
        }
    }

    async fn run_refresh(&self) -> Result<String, RefreshFailure> {
        let refresh_token = match self.store.get_token_data().await {
            Ok(Some(data)) => data.refresh_token.filter(|t| !t.is_empty()),
            Ok(None) => None,
            Err(err) => return Err(RefreshFailure::Transport(err.to_string())),
        };
        let Some(refresh_token) = refresh_token else {
            return Err(RefreshFailure::MissingRefreshToken);
        };
        match self.store.refresh_access_token(&refresh_token).await {
            Ok(Some(token)) => Ok(token),
            Ok(None) => Err(RefreshFailure::Rejected),
            Err(err) => Err(RefreshFailure::Transport(err.to_string())),
        }
    }

    /// Ends the session: removes stored tokens and raises the auth error signal. A refresh
    /// still in flight is discarded when it completes.
    pub async fn force_logout(&self, reason: &str) {
        let generation = {
            let mut state = self.lock();
            state.latest = None;
            state.generation += 1;
            state.generation
        };
        self.remove_tokens().await;
        event!(Level::WARN, reason, generation, "session.logout");
        self.status.set_auth_error(AUTH_EXPIRED_MESSAGE);
    }

    async fn remove_tokens(&self) {
        if let Err(err) = self.store.remove_token().await {
            event!(Level::ERROR, error = %err, "session.remove_token_failed");
        }
    }

    // Poisoning is ignored; every transition completes before the guard drops.
    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Leader's hold on the REFRESHING state. Dropping it unsettled (the leader's future was
/// cancelled) returns the coordinator to IDLE and rejects every waiter.
struct InFlight<'a> {
    coordinator: &'a RefreshCoordinator,
    started: u64,
    settled: bool,
}

impl InFlight<'_> {
    /// Publishes the new token, unless a logout landed while the refresh was in flight.
    /// In that case every waiter is rejected and the waiter count is returned as the error.
    fn succeed(mut self, value: String) -> Result<(FreshToken, usize), usize> {
        let coordinator = self.coordinator;
        let (token, waiters) = {
            let mut state = coordinator.lock();
            if state.generation != self.started {
                drop(state);
                return Err(self.fail(RefreshFailure::SessionEnded));
            }
            state.generation += 1;
            state.latest = Some(value.clone());
            let token = FreshToken {
                value,
                generation: state.generation,
            };
            (token, release(&mut state))
        };
        self.settled = true;
        let count = waiters.len();
        for waiter in waiters {
            let _ = waiter.send(Ok(token.clone()));
        }
        Ok((token, count))
    }

    fn fail(mut self, failure: RefreshFailure) -> usize {
        let waiters = release(&mut self.coordinator.lock());
        self.settled = true;
        let count = waiters.len();
        for waiter in waiters {
            let _ = waiter.send(Err(failure.clone()));
        }
        count
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let waiters = release(&mut self.coordinator.lock());
        event!(Level::WARN, waiters = waiters.len(), "refresh.abandoned");
        for waiter in waiters {
            let _ = waiter.send(Err(RefreshFailure::Abandoned));
        }
    }
}

/// Back to IDLE, handing over the queued waiters in enqueue order.
fn release(state: &mut RefreshState) -> VecDeque<oneshot::Sender<RefreshResult>> {
    state.refreshing = false;
    state.telemetry = None;
    std::mem::take(&mut state.pending)
}
