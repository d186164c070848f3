#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use huddle_gateway::connectivity::NetworkMonitor;
use huddle_gateway::status::StatusBoard;
use huddle_gateway::token::{TokenData, TokenStore};
use huddle_gateway::{Config, Error, Gateway};
use tracing::subscriber::{DefaultGuard, set_default};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Registry, fmt};

/// Token store double: issues `fresh` on refresh, optionally after a delay.
pub struct CountingStore {
    tokens: Mutex<Option<TokenData>>,
    issue: Option<String>,
    delay: Duration,
    fail_reads: bool,
    refresh_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(access: &str, refresh: Option<&str>) -> Self {
        Self {
            tokens: Mutex::new(Some(TokenData::new(access, refresh.map(str::to_string)))),
            issue: Some("fresh".to_string()),
            delay: Duration::ZERO,
            fail_reads: false,
            refresh_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting(mut self) -> Self {
        self.issue = None;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for CountingStore {
    async fn get_token(&self) -> Result<Option<String>, Error> {
        if self.fail_reads {
            return Err(Error::TokenStore("keychain locked".into()));
        }
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .as_ref()
            .map(|t| t.access_token.clone()))
    }

    async fn get_token_data(&self) -> Result<Option<TokenData>, Error> {
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<Option<String>, Error> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let Some(issued) = self.issue.clone() else {
            return Ok(None);
        };
        *self.tokens.lock().unwrap() = Some(TokenData::new(
            issued.clone(),
            Some(refresh_token.to_string()),
        ));
        Ok(Some(issued))
    }

    async fn remove_token(&self) -> Result<(), Error> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        *self.tokens.lock().unwrap() = None;
        Ok(())
    }
}

pub struct Harness {
    pub gateway: Gateway,
    pub store: Arc<CountingStore>,
    pub board: Arc<StatusBoard>,
    pub monitor: Arc<NetworkMonitor>,
}

pub fn harness(server_uri: &str, store: CountingStore) -> Harness {
    harness_with_timeout(server_uri, store, 5)
}

pub fn harness_with_timeout(server_uri: &str, store: CountingStore, timeout_secs: u64) -> Harness {
    let store = Arc::new(store);
    let board = Arc::new(StatusBoard::new());
    let monitor = Arc::new(NetworkMonitor::online());
    let config = Config::from_values(server_uri, Some(timeout_secs), None, Some(50), None);
    let gateway = Gateway::builder(config)
        .token_store(store.clone())
        .status_sink(board.clone())
        .reachability(monitor.clone())
        .build()
        .expect("gateway builds");
    Harness {
        gateway,
        store,
        board,
        monitor,
    }
}

struct VecWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl std::io::Write for VecWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.lines.lock().unwrap();
        guard.push(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn capture_logs() -> (Arc<Mutex<Vec<String>>>, DefaultGuard) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let writer_lines = lines.clone();
    let subscriber = Registry::default().with(
        fmt::Layer::default()
            .with_writer(move || VecWriter {
                lines: writer_lines.clone(),
            })
            .with_target(false)
            .with_level(true)
            .with_ansi(false),
    );
    let guard = set_default(subscriber);
    (lines, guard)
}
