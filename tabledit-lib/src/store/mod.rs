//! Remote table store.
//!
//! Provides the [`TableStore`] trait the editor loads and saves through, and
//! two implementations: [`HttpTableStore`] for the real backend and
//! [`InMemoryTableStore`] for tests and offline use.

mod config;
mod http;
mod memory;

pub use config::*;
pub use http::*;
pub use memory::*;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::model::RawRow;
use crate::save::PersistRequest;

/// The store's answer to a successful persist call.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistResponse {
    /// HTTP status (or `200` for stores without one).
    pub status: u16,
    /// The response body as JSON (`Null` when empty).
    pub body: Value,
}

impl PersistResponse {
    /// Creates a plain `200` response with the given body.
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

/// Trait for table stores.
///
/// Each call either succeeds or fails as a whole; implementations do not
/// retry.
///
/// # Example
///
/// ```ignore
/// use tabledit_lib::store::{InMemoryTableStore, TableStore};
///
/// let store = InMemoryTableStore::new();
/// store.insert_json("people", r#"[{"name": "Ada"}]"#)?;
///
/// let rows = store.fetch_table("people").await?;
/// assert_eq!(rows.len(), 1);
/// ```
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Fetches every row of a table.
    ///
    /// An empty list is a valid answer for a table without rows.
    async fn fetch_table(&self, table: &str) -> Result<Vec<RawRow>, ApiError>;

    /// Persists a table.
    async fn persist_table(&self, request: &PersistRequest) -> Result<PersistResponse, ApiError>;
}

#[async_trait]
impl<T: TableStore + ?Sized> TableStore for std::sync::Arc<T> {
    async fn fetch_table(&self, table: &str) -> Result<Vec<RawRow>, ApiError> {
        (**self).fetch_table(table).await
    }

    async fn persist_table(&self, request: &PersistRequest) -> Result<PersistResponse, ApiError> {
        (**self).persist_table(request).await
    }
}
