use reqwest::StatusCode;

/// Shown to the user when the session cannot be recovered locally.
pub const AUTH_EXPIRED_MESSAGE: &str = "Session expired, please log in again.";

/// Generic notice raised on the global error channel for 5xx responses.
pub const SERVER_ERROR_MESSAGE: &str = "Server error, please try again later.";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("network unavailable")]
    NetworkUnavailable,
    #[error("authentication failed ({status}): {reason}")]
    AuthExhausted {
        status: StatusCode,
        body: String,
        reason: String,
    },
    #[error("not found: {body}")]
    NotFound { body: String },
    #[error("server error ({status}): {body}")]
    Server { status: StatusCode, body: String },
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("token store error: {0}")]
    TokenStore(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("api error: {0}")]
    Api(String),
}

impl Error {
    /// HTTP status carried by the error, when a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::AuthExhausted { status, .. }
            | Error::Server { status, .. }
            | Error::Http { status, .. } => Some(*status),
            Error::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Error::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_auth_exhausted(&self) -> bool {
        matches!(self, Error::AuthExhausted { .. })
    }
}

/// Why a refresh attempt did not produce a new access token.
///
/// Cloned to every request waiting on the same refresh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshFailure {
    #[error("no refresh token available")]
    MissingRefreshToken,
    #[error("refresh token rejected")]
    Rejected,
    #[error("refresh request failed: {0}")]
    Transport(String),
    #[error("refresh abandoned before completion")]
    Abandoned,
    #[error("session ended during refresh")]
    SessionEnded,
}
