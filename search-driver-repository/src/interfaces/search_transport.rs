//! Search transport trait definition.
//!
//! This module defines the abstract interface for the engine's REST calls,
//! allowing for different backend implementations (OpenSearch, Elasticsearch,
//! a recording mock in tests).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;

/// Abstract interface for search engine requests.
///
/// Write and query methods take a fully built payload: a JSON object with
/// `index`, optionally `type` and `id`, a `body`, and request parameters
/// such as `refresh`. Implementations translate it into the matching HTTP
/// call and map any non-success response to a [`SearchError`].
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Check whether an index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    /// Create an index. The payload body carries settings and mappings.
    async fn create_index(&self, payload: Value) -> Result<(), SearchError>;

    /// Read the settings of an index, as returned by the engine.
    async fn get_settings(&self, index: &str) -> Result<Value, SearchError>;

    /// Update index settings.
    async fn put_settings(&self, payload: Value) -> Result<(), SearchError>;

    /// Push a field mapping.
    async fn put_mapping(&self, payload: Value) -> Result<(), SearchError>;

    /// Send a bulk request. The payload body is a list of NDJSON lines.
    ///
    /// Returns the engine's response so per-item errors can be inspected.
    async fn bulk(&self, payload: Value) -> Result<Value, SearchError>;

    /// Index (create or replace) a single document.
    async fn index(&self, payload: Value) -> Result<(), SearchError>;

    /// Delete a single document.
    async fn delete(&self, payload: Value) -> Result<(), SearchError>;

    /// Execute a search and return the raw response.
    async fn search(&self, payload: Value) -> Result<Value, SearchError>;

    /// Execute a count and return the raw response.
    async fn count(&self, payload: Value) -> Result<Value, SearchError>;
}

/// Caller-supplied override for query execution.
///
/// When a builder carries a callback, the engine hands it the transport, the
/// free-text query and the built payload instead of running the search itself.
#[async_trait]
pub trait SearchCallback: Send + Sync {
    async fn call(
        &self,
        transport: &dyn SearchTransport,
        query: &str,
        payload: Value,
    ) -> Result<Value, SearchError>;
}
