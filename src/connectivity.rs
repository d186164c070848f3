use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::Error;
use crate::status::StatusSink;

/// Network reachability source: a one-shot check plus a stream of changes.
#[async_trait]
pub trait Reachability: Send + Sync {
    /// Returns `true` when the network is reachable.
    async fn fetch(&self) -> bool;

    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Reachability fed by the host platform's connectivity events.
pub struct NetworkMonitor {
    tx: watch::Sender<bool>,
}

impl NetworkMonitor {
    pub fn new(connected: bool) -> Self {
        let (tx, _rx) = watch::channel(connected);
        Self { tx }
    }

    pub fn online() -> Self {
        Self::new(true)
    }

    pub fn set_connected(&self, connected: bool) {
        self.tx.send_replace(connected);
    }

    pub fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::online()
    }
}

#[async_trait]
impl Reachability for NetworkMonitor {
    async fn fetch(&self) -> bool {
        self.is_connected()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Fails requests fast while offline and mirrors the offline flag to the status channel.
pub struct ConnectivityGuard {
    reachability: Arc<dyn Reachability>,
    status: Arc<dyn StatusSink>,
    offline: Arc<AtomicBool>,
    watcher: Option<JoinHandle<()>>,
}

impl ConnectivityGuard {
    pub fn new(reachability: Arc<dyn Reachability>, status: Arc<dyn StatusSink>) -> Self {
        Self {
            reachability,
            status,
            offline: Arc::new(AtomicBool::new(false)),
            watcher: None,
        }
    }

    /// Starts tracking change events. A no-op outside a Tokio runtime, in which case the
    /// flag is only refreshed by [`ConnectivityGuard::check`].
    pub fn spawn_watcher(&mut self) {
        if self.watcher.is_some() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("connectivity.watcher_skipped");
            return;
        };
        let mut rx = self.reachability.subscribe();
        let offline = Arc::clone(&self.offline);
        let status = Arc::clone(&self.status);
        self.watcher = Some(handle.spawn(async move {
            let connected = *rx.borrow_and_update();
            record(&offline, status.as_ref(), !connected);
            while rx.changed().await.is_ok() {
                let connected = *rx.borrow_and_update();
                record(&offline, status.as_ref(), !connected);
            }
        }));
    }

    pub async fn check(&self) -> Result<(), Error> {
        let connected = self.reachability.fetch().await;
        record(&self.offline, self.status.as_ref(), !connected);
        if connected {
            Ok(())
        } else {
            warn!("request.offline");
            Err(Error::NetworkUnavailable)
        }
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}

impl Drop for ConnectivityGuard {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

fn record(flag: &AtomicBool, status: &dyn StatusSink, offline: bool) {
    let previous = flag.swap(offline, Ordering::SeqCst);
    if previous != offline {
        debug!(offline, "connectivity.changed");
    }
    status.set_offline_status(offline);
}
