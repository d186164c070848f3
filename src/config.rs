//! read gateway configuration from a file, the environment, or explicit values

use std::path::Path;
use std::time::Duration;

use crate::errors::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
const DEFAULT_LEDGER_CAPACITY: usize = 500;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_ledger_capacity")]
    pub ledger_capacity: usize,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_ledger_capacity() -> usize {
    DEFAULT_LEDGER_CAPACITY
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// # ENV Vars
    /// * `HUDDLE_API_URL` - Base URL of the REST API (required)
    /// * `HUDDLE_API_TIMEOUT_SECS` - Per-request timeout in seconds
    /// * `HUDDLE_REFRESH_PATH` - Path of the token refresh endpoint
    /// * `HUDDLE_LEDGER_CAPACITY` - Maximum number of tracked requests
    /// * `HUDDLE_USER_AGENT` - User-Agent header override
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("HUDDLE_API_URL")
            .map_err(|_| Error::Config("Missing HUDDLE_API_URL env var".to_string()))?;
        let timeout_secs = match std::env::var("HUDDLE_API_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::Config(format!("Invalid HUDDLE_API_TIMEOUT_SECS value '{raw}'"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        let ledger_capacity = match std::env::var("HUDDLE_LEDGER_CAPACITY") {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::Config(format!("Invalid HUDDLE_LEDGER_CAPACITY value '{raw}'"))
            })?,
            Err(_) => DEFAULT_LEDGER_CAPACITY,
        };
        Ok(Config {
            base_url,
            timeout_secs,
            refresh_path: std::env::var("HUDDLE_REFRESH_PATH")
                .unwrap_or_else(|_| default_refresh_path()),
            ledger_capacity,
            user_agent: std::env::var("HUDDLE_USER_AGENT").ok(),
        })
    }

    pub fn from_values(
        base_url: impl Into<String>,
        timeout_secs: Option<u64>,
        refresh_path: Option<String>,
        ledger_capacity: Option<usize>,
        user_agent: Option<String>,
    ) -> Self {
        Config {
            base_url: base_url.into(),
            timeout_secs: timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            refresh_path: refresh_path.unwrap_or_else(default_refresh_path),
            ledger_capacity: ledger_capacity.unwrap_or(DEFAULT_LEDGER_CAPACITY),
            user_agent,
        }
    }

    /// Base URL with a scheme and without a trailing slash, validated.
    pub fn normalized_base_url(&self) -> Result<String, Error> {
        let base = if self.base_url.starts_with("http") {
            self.base_url.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.base_url.trim_end_matches('/'))
        };
        reqwest::Url::parse(&base)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base, e)))?;
        Ok(base)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("huddle-gateway/{}", env!("CARGO_PKG_VERSION")))
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be > 0".into()));
        }
        if self.ledger_capacity == 0 {
            return Err(Error::Config("ledger_capacity must be > 0".into()));
        }
        if !self.refresh_path.starts_with('/') {
            return Err(Error::Config(format!(
                "refresh_path '{}' must start with '/'",
                self.refresh_path
            )));
        }
        self.normalized_base_url().map(|_| ())
    }
}
