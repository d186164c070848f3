use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    connectivity::ConnectivityGuard, errors::Error, ledger::RequestId, ledger::RequestLedger,
    refresh::RefreshCoordinator, status::StatusSink, token::TokenStore, types::ApiEnvelope,
};

mod builder;
mod impls;

pub use builder::GatewayBuilder;

/// Authenticated HTTP gateway in front of the REST API.
///
/// Cheap to clone; clones share the ledger, the token store and the refresh state.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    http_client: Client,
    base_url: String,
    connectivity: ConnectivityGuard,
    ledger: Arc<RequestLedger>,
    store: Arc<dyn TokenStore>,
    coordinator: Arc<RefreshCoordinator>,
    status: Arc<dyn StatusSink>,
}

/// Per-request inputs. Kept by value so a replay rebuilds the identical request.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone, Debug)]
pub struct GatewayResponse {
    pub request_id: RequestId,
    pub status: StatusCode,
    pub body: String,
}

impl GatewayResponse {
    /// Decodes the body; an empty body decodes as JSON `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let body = self.body.trim();
        if body.is_empty() {
            return Ok(serde_json::from_str("null")?);
        }
        Ok(serde_json::from_str(body)?)
    }

    pub fn envelope(&self) -> Result<ApiEnvelope, Error> {
        self.json()
    }
}
