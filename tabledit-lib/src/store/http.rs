//! HTTP table store

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::PersistResponse;
use super::StoreConfig;
use super::TableStore;
use super::config::parse_endpoint;
use crate::error::ApiError;
use crate::model::RawRow;
use crate::save::PersistRequest;

/// A table store reached over HTTP.
///
/// Both calls are JSON `POST`s:
///
/// - fetch sends `{"table": name}` and expects an array of flat objects,
/// - persist sends the [`PersistRequest`] and expects a 2xx answer.
///
/// This store is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use tabledit_lib::store::HttpTableStore;
///
/// let store = HttpTableStore::builder()
///     .fetch_url("http://localhost:8080/data")
///     .persist_url("http://localhost:8000/updateTable")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
#[derive(Clone)]
pub struct HttpTableStore {
    inner: Arc<HttpTableStoreInner>,
}

struct HttpTableStoreInner {
    fetch_url: Url,
    persist_url: Url,
    http_client: Client,
    timeout: Option<Duration>,
}

#[derive(Serialize)]
struct FetchRequest<'a> {
    table: &'a str,
}

impl HttpTableStore {
    /// Creates a new builder for constructing a store.
    pub fn builder() -> HttpTableStoreBuilder<Missing, Missing> {
        HttpTableStoreBuilder::new()
    }

    /// Creates a store from a [`StoreConfig`].
    pub fn from_config(config: &StoreConfig) -> Result<Self, ApiError> {
        let mut builder = Self::builder()
            .fetch_url(config.fetch_url.clone())
            .persist_url(config.persist_url.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        builder.build()
    }

    /// Returns the fetch endpoint.
    pub fn fetch_url(&self) -> &str {
        self.inner.fetch_url.as_str()
    }

    /// Returns the persist endpoint.
    pub fn persist_url(&self) -> &str {
        self.inner.persist_url.as_str()
    }

    /// Posts a JSON body and returns the status and raw response body.
    async fn post(&self, url: &Url, body: String) -> Result<(u16, String), ApiError> {
        let mut request = self
            .inner
            .http_client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        Ok((status, text))
    }

    fn map_send_error(&self, e: reqwest::Error) -> ApiError {
        match self.inner.timeout {
            Some(timeout) if e.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::Network(e),
        }
    }
}

#[async_trait]
impl TableStore for HttpTableStore {
    async fn fetch_table(&self, table: &str) -> Result<Vec<RawRow>, ApiError> {
        let body = serde_json::to_string(&FetchRequest { table })
            .map_err(|e| ApiError::parse(format!("failed to encode fetch request: {}", e)))?;

        log::debug!("POST {} table={}", self.inner.fetch_url, table);
        let (status, text) = self.post(&self.inner.fetch_url, body).await?;

        if !(200..300).contains(&status) {
            if status == 404 {
                return Err(ApiError::TableNotFound(table.to_string()));
            }
            return Err(ApiError::http(status, text));
        }

        serde_json::from_str::<Vec<RawRow>>(&text)
            .map_err(|e| ApiError::parse_with_body(format!("expected an array of rows: {}", e), text))
    }

    async fn persist_table(&self, request: &PersistRequest) -> Result<PersistResponse, ApiError> {
        let body = serde_json::to_string(request)
            .map_err(|e| ApiError::parse(format!("failed to encode persist request: {}", e)))?;

        log::debug!("POST {} table={}", self.inner.persist_url, request.table);
        let (status, text) = self.post(&self.inner.persist_url, body.clone()).await?;

        if !(200..300).contains(&status) {
            return Err(ApiError::persist_rejected(status, body, text));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| ApiError::parse_with_body(format!("invalid persist response: {}", e), text))?
        };

        Ok(PersistResponse { status, body })
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Endpoint not given yet.
pub struct Missing;

/// Endpoint given.
pub struct Set<T>(T);

/// Builder for an [`HttpTableStore`].
///
/// `build` only exists once both the fetch and the persist endpoint are set.
/// Timeouts and the `reqwest` client are optional.
pub struct HttpTableStoreBuilder<Fetch, Persist> {
    fetch_url: Fetch,
    persist_url: Persist,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl HttpTableStoreBuilder<Missing, Missing> {
    /// Starts a builder with no endpoints.
    pub fn new() -> Self {
        Self {
            fetch_url: Missing,
            persist_url: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }
}

impl Default for HttpTableStoreBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> HttpTableStoreBuilder<Missing, P> {
    /// Sets the URL that table rows are read from.
    pub fn fetch_url(self, url: impl Into<String>) -> HttpTableStoreBuilder<Set<String>, P> {
        HttpTableStoreBuilder {
            fetch_url: Set(url.into()),
            persist_url: self.persist_url,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<F> HttpTableStoreBuilder<F, Missing> {
    /// Sets the URL that save payloads are posted to.
    pub fn persist_url(self, url: impl Into<String>) -> HttpTableStoreBuilder<F, Set<String>> {
        HttpTableStoreBuilder {
            fetch_url: self.fetch_url,
            persist_url: Set(url.into()),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<F, P> HttpTableStoreBuilder<F, P> {
    /// Limits how long a fetch or persist call may take.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Limits connection setup. Ignored when a client is supplied.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Shares an existing `reqwest` client instead of creating one.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl HttpTableStoreBuilder<Set<String>, Set<String>> {
    /// Checks both endpoints and creates the store.
    ///
    /// Fails with [`ApiError::InvalidUrl`] unless both are http(s) URLs.
    pub fn build(self) -> Result<HttpTableStore, ApiError> {
        let fetch_url = parse_endpoint(&self.fetch_url.0)?;
        let persist_url = parse_endpoint(&self.persist_url.0)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(HttpTableStore {
            inner: Arc::new(HttpTableStoreInner {
                fetch_url,
                persist_url,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}
