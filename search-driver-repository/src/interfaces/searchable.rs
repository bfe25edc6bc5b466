//! Model capability and primary store traits.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::SearchError;
use crate::interfaces::SearchRule;
use crate::rules::QueryStringRule;

/// Document field holding the soft-delete flag (`1` trashed, `0` live).
pub const SOFT_DELETED_FIELD: &str = "__soft_deleted";

/// A model that can be indexed and searched.
///
/// Type-level items (`searchable_as`, `mapping`, ...) describe the model type;
/// instance methods describe one record.
pub trait Searchable: Send + Sync + Sized + 'static {
    /// Document type name used for this model.
    fn searchable_as() -> String;

    /// The model's primary key, if it has one.
    fn search_key(&self) -> Option<String>;

    /// Fields to store in the search document.
    fn to_searchable_document(&self) -> Map<String, Value>;

    /// Field mapping declaration, e.g. `{ "properties": { ... } }`.
    fn mapping() -> Map<String, Value> {
        Map::new()
    }

    /// Whether the model type supports soft deletes.
    fn uses_soft_delete() -> bool {
        false
    }

    /// Whether this record is soft deleted.
    fn is_trashed(&self) -> bool {
        false
    }

    /// Search rules tried in order until one returns hits.
    fn search_rules() -> Vec<Arc<dyn SearchRule>> {
        vec![Arc::new(QueryStringRule)]
    }
}

/// The primary data store that owns the full model rows.
#[async_trait]
pub trait ModelStore<M: Searchable>: Send + Sync {
    /// Load the models with the given keys, in any order.
    ///
    /// `columns` restricts the loaded fields when set. `with_trashed`
    /// includes soft-deleted rows.
    async fn find_by_keys(
        &self,
        keys: &[String],
        columns: Option<&[String]>,
        with_trashed: bool,
    ) -> Result<Vec<M>, SearchError>;
}
