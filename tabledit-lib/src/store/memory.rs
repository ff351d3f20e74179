//! In-memory table store using DashMap

use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::json;

use super::PersistResponse;
use super::TableStore;
use crate::error::ApiError;
use crate::model::RawRow;
use crate::save::PersistRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Call {
    Fetch,
    Persist,
}

/// A table store held in a concurrent hash map.
///
/// Persisting replaces a table's rows with the payload's rows. Failures can be
/// queued up front to exercise error paths, and a fixed latency can be added
/// to every call.
///
/// # Example
///
/// ```
/// use tabledit_lib::store::InMemoryTableStore;
///
/// let store = InMemoryTableStore::new();
/// store.insert_json("people", r#"[{"name": "Ada"}]"#).unwrap();
/// assert!(store.contains("people"));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTableStore {
    tables: DashMap<String, Vec<RawRow>>,
    last_persist: DashMap<String, PersistRequest>,
    failures: DashMap<Call, VecDeque<ApiError>>,
    fetches: AtomicUsize,
    persists: AtomicUsize,
    latency: Option<Duration>,
}

impl InMemoryTableStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Stores a table's rows, replacing any existing table of that name.
    pub fn insert(&self, table: impl Into<String>, rows: Vec<RawRow>) {
        self.tables.insert(table.into(), rows);
    }

    /// Stores a table given as a JSON array of objects.
    pub fn insert_json(&self, table: impl Into<String>, json: &str) -> Result<(), ApiError> {
        let rows: Vec<RawRow> = serde_json::from_str(json)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), json))?;
        self.insert(table, rows);
        Ok(())
    }

    /// Returns a copy of a table's rows.
    pub fn rows(&self, table: &str) -> Option<Vec<RawRow>> {
        self.tables.get(table).map(|rows| rows.value().clone())
    }

    /// Returns `true` if the table exists.
    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Returns the last payload persisted for a table.
    pub fn last_persist(&self, table: &str) -> Option<PersistRequest> {
        self.last_persist.get(table).map(|r| r.value().clone())
    }

    /// Makes the next fetch fail with `error`.
    pub fn fail_next_fetch(&self, error: ApiError) {
        self.failures.entry(Call::Fetch).or_default().push_back(error);
    }

    /// Makes the next persist fail with `error`.
    pub fn fail_next_persist(&self, error: ApiError) {
        self.failures.entry(Call::Persist).or_default().push_back(error);
    }

    /// Returns the number of fetch calls seen.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Returns the number of persist calls seen.
    pub fn persist_count(&self) -> usize {
        self.persists.load(Ordering::SeqCst)
    }

    fn take_failure(&self, call: Call) -> Option<ApiError> {
        self.failures.get_mut(&call)?.pop_front()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn fetch_table(&self, table: &str) -> Result<Vec<RawRow>, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if let Some(error) = self.take_failure(Call::Fetch) {
            return Err(error);
        }

        self.rows(table)
            .ok_or_else(|| ApiError::TableNotFound(table.to_string()))
    }

    async fn persist_table(&self, request: &PersistRequest) -> Result<PersistResponse, ApiError> {
        self.persists.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.last_persist
            .insert(request.table.clone(), request.clone());
        if let Some(error) = self.take_failure(Call::Persist) {
            return Err(error);
        }

        let mut rows = request.data.to_raw_rows();
        for row in &mut rows {
            for column in &request.columns_to_delete {
                row.remove(column);
            }
        }
        let count = rows.len();
        self.tables.insert(request.table.clone(), rows);

        Ok(PersistResponse::ok(json!({ "updated": count })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;

    #[tokio::test]
    async fn test_fetch_unknown_table() {
        let store = InMemoryTableStore::new();
        let err = store.fetch_table("nope").await.unwrap_err();
        assert!(matches!(err, ApiError::TableNotFound(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_queued_failure_is_used_once() {
        let store = InMemoryTableStore::new();
        store.insert_json("t", r#"[{"x": "1"}]"#).unwrap();
        store.fail_next_fetch(ApiError::http(503, "down"));

        assert!(store.fetch_table("t").await.is_err());
        assert_eq!(store.fetch_table("t").await.unwrap().len(), 1);
        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_latency_is_applied() {
        let store = InMemoryTableStore::new().with_latency(Duration::from_millis(20));
        store.insert_json("t", "[]").unwrap();

        let started = std::time::Instant::now();
        store.fetch_table("t").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_persist_replaces_rows() {
        let store = InMemoryTableStore::new();
        let data: Table = serde_json::from_str(r#"[{"a": "1"}, {"a": "2"}]"#).unwrap();
        let request = PersistRequest {
            table: "t".into(),
            data,
            columns_to_delete: vec!["gone".into()],
        };

        let response = store.persist_table(&request).await.unwrap();

        assert_eq!(response.body, json!({ "updated": 2 }));
        assert_eq!(store.rows("t").unwrap().len(), 2);
        assert_eq!(store.last_persist("t"), Some(request));
        assert_eq!(store.persist_count(), 1);
    }
}
