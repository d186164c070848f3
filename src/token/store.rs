use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Session credentials held by a [`TokenStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    #[serde(alias = "token", alias = "accessToken")]
    pub access_token: String,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

impl TokenData {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

/// Owner of the session credentials. The gateway reads from it on every request and
/// writes to it only through `refresh_access_token` and `remove_token`.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get_token(&self) -> Result<Option<String>, Error>;

    async fn get_token_data(&self) -> Result<Option<TokenData>, Error>;

    /// Exchanges a refresh token for a new access token and stores it.
    ///
    /// `Ok(None)` means the issuer explicitly refused the refresh token.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<Option<String>, Error>;

    async fn remove_token(&self) -> Result<(), Error>;
}
