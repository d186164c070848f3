use std::sync::Arc;

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::info;

use crate::{
    config::Config,
    connectivity::{ConnectivityGuard, NetworkMonitor, Reachability},
    errors::Error,
    ledger::RequestLedger,
    refresh::RefreshCoordinator,
    status::{StatusBoard, StatusSink},
    token::TokenStore,
};

use super::{Gateway, GatewayInner};

pub struct GatewayBuilder {
    config: Config,
    store: Option<Arc<dyn TokenStore>>,
    status: Option<Arc<dyn StatusSink>>,
    reachability: Option<Arc<dyn Reachability>>,
    coordinator: Option<Arc<RefreshCoordinator>>,
    ledger: Option<Arc<RequestLedger>>,
}

impl GatewayBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: None,
            status: None,
            reachability: None,
            coordinator: None,
            ledger: None,
        }
    }

    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn status_sink(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn reachability(mut self, reachability: Arc<dyn Reachability>) -> Self {
        self.reachability = Some(reachability);
        self
    }

    /// Injects a prebuilt coordinator. It must wrap the same token store and status sink
    /// given to this builder.
    pub fn refresh_coordinator(mut self, coordinator: Arc<RefreshCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    pub fn ledger(mut self, ledger: Arc<RequestLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Validates the configuration and assembles the pipeline. When called inside a Tokio
    /// runtime the connectivity watcher starts immediately.
    pub fn build(self) -> Result<Gateway, Error> {
        let config = self.config;
        config.validate()?;
        let base_url = config.normalized_base_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .default_headers(headers)
            .build()?;

        let store = self
            .store
            .ok_or_else(|| Error::Config("A token store is required".into()))?;
        let status: Arc<dyn StatusSink> = self
            .status
            .unwrap_or_else(|| Arc::new(StatusBoard::new()));
        let reachability: Arc<dyn Reachability> = self
            .reachability
            .unwrap_or_else(|| Arc::new(NetworkMonitor::online()));
        let coordinator = self.coordinator.unwrap_or_else(|| {
            Arc::new(RefreshCoordinator::new(
                Arc::clone(&store),
                Arc::clone(&status),
            ))
        });
        let ledger = self
            .ledger
            .unwrap_or_else(|| Arc::new(RequestLedger::new(config.ledger_capacity)));

        let mut connectivity = ConnectivityGuard::new(reachability, Arc::clone(&status));
        connectivity.spawn_watcher();

        info!(
            "gateway ready: base_url='{}' timeout_secs={} ledger_capacity={}",
            base_url,
            config.timeout_secs,
            ledger.capacity()
        );

        Ok(Gateway {
            inner: Arc::new(GatewayInner {
                http_client,
                base_url,
                connectivity,
                ledger,
                store,
                coordinator,
                status,
            }),
        })
    }
}
