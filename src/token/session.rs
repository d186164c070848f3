use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{config::Config, errors::Error};

use super::{TokenData, TokenStore};

/// Accepts `{success, data: {token, refreshToken}}` as well as a bare `{token, refreshToken}`.
fn issued_tokens(body: &str) -> Result<Option<TokenData>, Error> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.get("success").and_then(|s| s.as_bool()) == Some(false) {
        warn!(
            "token refresh refused: message='{}'",
            value.get("message").and_then(|m| m.as_str()).unwrap_or_default()
        );
        return Ok(None);
    }
    let data = value.get("data").filter(|d| d.is_object()).cloned();
    match serde_json::from_value(data.unwrap_or(value)) {
        Ok(tokens) => Ok(Some(tokens)),
        Err(err) => {
            warn!("token refresh response unreadable: {}", err);
            Ok(None)
        }
    }
}

/// Keeps session tokens in memory and renews them against the refresh endpoint.
///
/// The refresh request uses its own [`Client`], never the gateway pipeline.
pub struct SessionTokenStore {
    tokens: RwLock<Option<TokenData>>,
    refresh_url: String,
    user_agent: String,
    http_client: Client,
}

impl SessionTokenStore {
    pub fn new(config: &Config, tokens: Option<TokenData>) -> Result<Self, Error> {
        config.validate()?;
        let http_client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            tokens: RwLock::new(tokens),
            refresh_url: format!("{}{}", config.normalized_base_url()?, config.refresh_path),
            user_agent: config.user_agent(),
            http_client,
        })
    }

    /// Stores credentials after a successful login.
    pub async fn set_tokens(&self, tokens: TokenData) {
        *self.tokens.write().await = Some(tokens);
    }
}

#[async_trait]
impl TokenStore for SessionTokenStore {
    async fn get_token(&self) -> Result<Option<String>, Error> {
        Ok(self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone()))
    }

    async fn get_token_data(&self) -> Result<Option<TokenData>, Error> {
        Ok(self.tokens.read().await.clone())
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<Option<String>, Error> {
        let resp = self
            .http_client
            .post(&self.refresh_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("User-Agent", self.user_agent.as_str())
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!("token refresh rejected: status={} body='{}'", status, body);
            return Ok(None);
        }

        let Some(issued) = issued_tokens(&body)? else {
            return Ok(None);
        };

        let mut tokens = self.tokens.write().await;
        let refresh_token = issued
            .refresh_token
            .or_else(|| tokens.as_ref().and_then(|t| t.refresh_token.clone()));
        let access_token = issued.access_token;
        info!("access token refreshed (len={})", access_token.len());
        *tokens = Some(TokenData::new(access_token.clone(), refresh_token));
        Ok(Some(access_token))
    }

    async fn remove_token(&self) -> Result<(), Error> {
        *self.tokens.write().await = None;
        Ok(())
    }
}
