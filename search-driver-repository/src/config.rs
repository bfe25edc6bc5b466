//! Configuration types for the search engine driver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default index name.
pub const DEFAULT_INDEX: &str = "models";

/// Default `index.max_result_window` setting.
pub const DEFAULT_MAX_RESULT_WINDOW: u64 = 200_000;

/// How model batches are written to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexingStrategy {
    /// One bulk request per batch.
    #[default]
    Bulk,
    /// One request per model.
    Single,
}

impl FromStr for IndexingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulk" => Ok(Self::Bulk),
            "single" => Ok(Self::Single),
            other => Err(format!("unknown indexing strategy '{}'", other)),
        }
    }
}

impl fmt::Display for IndexingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bulk => f.write_str("bulk"),
            Self::Single => f.write_str("single"),
        }
    }
}

/// Refresh policy applied to document writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRefresh {
    True,
    False,
    WaitFor,
}

impl DocumentRefresh {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::WaitFor => "wait_for",
        }
    }
}

impl FromStr for DocumentRefresh {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Self::True),
            "false" | "0" => Ok(Self::False),
            "wait_for" => Ok(Self::WaitFor),
            other => Err(format!("unknown refresh policy '{}'", other)),
        }
    }
}

/// Configuration for the ElasticEngine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Index all model types are written to.
    pub index: String,
    /// Minimum `index.max_result_window` enforced at startup.
    pub max_result_window: u64,
    /// Refresh policy sent with every document write. `None` leaves it to the engine.
    pub document_refresh: Option<DocumentRefresh>,
    /// Track soft deletes through the `__soft_deleted` field instead of removing documents.
    pub soft_delete: bool,
    /// Bulk or single-document writes.
    pub indexer: IndexingStrategy,
    /// Push each model type's mapping before its first write.
    pub update_mapping: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index: DEFAULT_INDEX.to_string(),
            max_result_window: DEFAULT_MAX_RESULT_WINDOW,
            document_refresh: None,
            soft_delete: false,
            indexer: IndexingStrategy::Bulk,
            update_mapping: true,
        }
    }
}

impl EngineConfig {
    /// Create a config for the given index with default settings.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            ..Self::default()
        }
    }

    /// Prepend a prefix to the index name.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.index = format!("{}{}", prefix, self.index);
        self
    }

    pub fn with_indexer(mut self, indexer: IndexingStrategy) -> Self {
        self.indexer = indexer;
        self
    }

    pub fn with_soft_delete(mut self, soft_delete: bool) -> Self {
        self.soft_delete = soft_delete;
        self
    }

    pub fn with_document_refresh(mut self, refresh: DocumentRefresh) -> Self {
        self.document_refresh = Some(refresh);
        self
    }

    pub fn with_max_result_window(mut self, max_result_window: u64) -> Self {
        self.max_result_window = max_result_window;
        self
    }

    pub fn with_update_mapping(mut self, update_mapping: bool) -> Self {
        self.update_mapping = update_mapping;
        self
    }
}
