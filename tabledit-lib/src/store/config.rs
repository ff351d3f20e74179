//! Store endpoint configuration

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ApiError;

/// Default endpoint for fetching a table.
pub const DEFAULT_FETCH_URL: &str = "http://localhost:8080/data";

/// Default endpoint for persisting a table.
pub const DEFAULT_PERSIST_URL: &str = "http://localhost:8000/updateTable";

/// Environment variable overriding the fetch endpoint.
pub const FETCH_URL_VAR: &str = "TABLEDIT_FETCH_URL";

/// Environment variable overriding the persist endpoint.
pub const PERSIST_URL_VAR: &str = "TABLEDIT_PERSIST_URL";

/// Environment variable setting the request timeout in seconds.
pub const TIMEOUT_VAR: &str = "TABLEDIT_TIMEOUT_SECS";

/// Configuration for the HTTP table store.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tabledit_lib::store::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_fetch_url("http://tables.internal/data")
///     .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(config.persist_url, "http://localhost:8000/updateTable");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Endpoint that answers table fetches.
    pub fetch_url: String,

    /// Endpoint that accepts table saves.
    pub persist_url: String,

    /// Per-request timeout.
    ///
    /// Default: none
    pub timeout: Option<Duration>,

    /// Connection timeout.
    ///
    /// Default: none
    pub connect_timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fetch_url: DEFAULT_FETCH_URL.to_string(),
            persist_url: DEFAULT_PERSIST_URL.to_string(),
            timeout: None,
            connect_timeout: None,
        }
    }
}

impl StoreConfig {
    /// Creates a config with the default endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config from the defaults overridden by environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var(FETCH_URL_VAR) {
            config.fetch_url = url;
        }
        if let Ok(url) = env::var(PERSIST_URL_VAR) {
            config.persist_url = url;
        }
        if let Ok(secs) = env::var(TIMEOUT_VAR) {
            match secs.parse::<u64>() {
                Ok(secs) => config.timeout = Some(Duration::from_secs(secs)),
                Err(_) => log::warn!("ignoring {}={:?}: not a number of seconds", TIMEOUT_VAR, secs),
            }
        }

        config
    }

    /// Sets the fetch endpoint.
    pub fn with_fetch_url(mut self, url: impl Into<String>) -> Self {
        self.fetch_url = url.into();
        self
    }

    /// Sets the persist endpoint.
    pub fn with_persist_url(mut self, url: impl Into<String>) -> Self {
        self.persist_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Checks that both endpoints are absolute http(s) URLs.
    pub fn validate(&self) -> Result<(), ApiError> {
        parse_endpoint(&self.fetch_url)?;
        parse_endpoint(&self.persist_url)?;
        Ok(())
    }
}

/// Parses an endpoint URL, accepting only http and https.
pub(crate) fn parse_endpoint(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::InvalidUrl(format!("{}: unsupported scheme '{}'", raw, other))),
    }
}
