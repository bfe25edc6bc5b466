//! Search error types.
//!
//! This module defines the error types that can occur while building payloads,
//! talking to the search engine and mapping results back to models.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// Failed to establish connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Search or count request failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to index a single document.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Bulk request failed, or the engine reported failed items.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to delete a document.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// Failed to check or create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to read or write index settings.
    #[error("Settings error: {0}")]
    SettingsError(String),

    /// Failed to push a field mapping.
    #[error("Mapping error: {0}")]
    MappingError(String),

    /// Failed to parse response from search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The request built by the caller is invalid.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A write payload was requested for a model without a key.
    #[error("The key value must be set to construct a payload for the {model} instance")]
    MissingKey { model: String },

    /// The primary data store failed while loading models for hits.
    #[error("Store error: {0}")]
    StoreError(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::SettingsError(msg.into())
    }

    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::MappingError(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an invalid query error.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn missing_key(model: impl Into<String>) -> Self {
        Self::MissingKey {
            model: model.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    /// Whether the error was raised before any request was sent.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingKey { .. } | Self::InvalidQuery(_))
    }
}
