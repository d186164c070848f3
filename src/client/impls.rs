use std::sync::Arc;

use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{
    classify::{Disposition, classify},
    config::Config,
    errors::{Error, SERVER_ERROR_MESSAGE},
    ledger::RequestLedger,
    refresh::RefreshCoordinator,
    request_context::RequestContext,
    types::ApiEnvelope,
};

use super::{Gateway, GatewayBuilder, GatewayResponse, RequestOptions};

impl Gateway {
    pub fn builder(config: Config) -> GatewayBuilder {
        GatewayBuilder::new(config)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn ledger(&self) -> Arc<RequestLedger> {
        Arc::clone(&self.inner.ledger)
    }

    pub fn coordinator(&self) -> Arc<RefreshCoordinator> {
        Arc::clone(&self.inner.coordinator)
    }

    pub fn is_offline(&self) -> bool {
        self.inner.connectivity.is_offline()
    }

    /// Sends one logical request through the full pipeline: connectivity check, token
    /// attachment, send, classification and, for an expired token, refresh and replay.
    pub async fn dispatch(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<GatewayResponse, Error> {
        self.inner.connectivity.check().await?;

        let url = self.url_for(path);
        let ledger = &self.inner.ledger;
        let request_id = ledger.add_request(method.as_str(), &url);
        // Must precede the token read: the recorded generation may lag the token, never lead it.
        let generation = self.inner.coordinator.generation();
        let token = match self.inner.store.get_token().await {
            Ok(token) => token,
            Err(err) => {
                error!(request_id = %request_id, error = %err, "request.token_unavailable");
                ledger.fail_request(request_id, &err.to_string());
                return Err(err);
            }
        };
        info!(request_id = %request_id, method = %method, url = %url, "request.dispatch");

        let ctx = RequestContext::new(request_id, generation);
        let outcome = self.drive(&method, &url, &options, ctx, token).await;
        match &outcome {
            Ok(resp) => {
                ledger.complete_request(request_id, resp.status.as_u16());
                debug!(request_id = %request_id, status = resp.status.as_u16(), "request.completed");
            }
            Err(err) => {
                ledger.fail_request(request_id, &err.to_string());
                debug!(request_id = %request_id, error = %err, "request.failed");
            }
        }
        outcome
    }

    async fn drive(
        &self,
        method: &Method,
        url: &str,
        options: &RequestOptions,
        mut ctx: RequestContext,
        mut token: Option<String>,
    ) -> Result<GatewayResponse, Error> {
        loop {
            let resp = self.send(method, url, options, &ctx, token.as_deref()).await?;
            let status = resp.status();
            let body = resp.text().await?;
            if status.is_success() {
                return Ok(GatewayResponse {
                    request_id: ctx.request_id,
                    status,
                    body,
                });
            }

            match classify(status, &body, &ctx.attempt) {
                Disposition::NotFound => return Err(Error::NotFound { body }),
                Disposition::AuthExpired => {
                    warn!(
                        request_id = %ctx.request_id,
                        status = status.as_u16(),
                        retry_count = ctx.attempt.retry_count,
                        "request.unauthorized; refreshing access token"
                    );
                    match self.inner.coordinator.refreshed_token(ctx.generation).await {
                        Ok(fresh) => {
                            ctx = ctx.replay(fresh.generation);
                            token = Some(fresh.value);
                        }
                        Err(failure) => {
                            return Err(Error::AuthExhausted {
                                status,
                                body,
                                reason: failure.to_string(),
                            });
                        }
                    }
                }
                Disposition::AuthExhausted(reason) => {
                    warn!(
                        request_id = %ctx.request_id,
                        status = status.as_u16(),
                        retry_count = ctx.attempt.retry_count,
                        reason,
                        "request.unauthorized; ending session"
                    );
                    self.inner.coordinator.force_logout(reason).await;
                    return Err(Error::AuthExhausted {
                        status,
                        body,
                        reason: reason.to_string(),
                    });
                }
                Disposition::ServerError => {
                    error!(request_id = %ctx.request_id, status = status.as_u16(), "request.server_error");
                    self.inner.status.set_global_error(SERVER_ERROR_MESSAGE);
                    return Err(Error::Server { status, body });
                }
                Disposition::Unclassified => return Err(Error::Http { status, body }),
            }
        }
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        options: &RequestOptions,
        ctx: &RequestContext,
        token: Option<&str>,
    ) -> Result<Response, Error> {
        let mut req = self
            .inner
            .http_client
            .request(method.clone(), url)
            .header("X-Request-ID", ctx.request_id.to_string());
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if !options.query.is_empty() {
            req = req.query(&options.query);
        }
        for (name, value) in &options.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            req = req.json(body);
        }
        req.send().await.map_err(|err| {
            warn!(request_id = %ctx.request_id, error = %err, timeout = err.is_timeout(), "request.transport_error");
            Error::Transport(err)
        })
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.inner.base_url, path)
        } else {
            format!("{}/{}", self.inner.base_url, path)
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.dispatch(Method::GET, path, RequestOptions::new())
            .await?
            .json()
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.dispatch(Method::POST, path, RequestOptions::new().json(body)?)
            .await?
            .json()
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.dispatch(Method::PUT, path, RequestOptions::new().json(body)?)
            .await?
            .json()
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.dispatch(Method::DELETE, path, RequestOptions::new())
            .await?
            .json()
    }

    /// Dispatches and validates the response envelope, returning its `data`.
    pub async fn send_envelope(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>, Error> {
        let resp = self.dispatch(method, path, options).await?;
        let envelope: ApiEnvelope = resp.json()?;
        envelope.into_data()
    }

    pub async fn get_envelope(&self, path: &str) -> Result<Option<Value>, Error> {
        self.send_envelope(Method::GET, path, RequestOptions::new())
            .await
    }
}
