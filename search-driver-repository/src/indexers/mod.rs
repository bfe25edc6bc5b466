//! Indexing strategies.
//!
//! Both strategies write the same documents; they differ only in how many
//! requests a batch turns into.

mod bulk;
mod single;

pub use bulk::BulkIndexer;
pub use single::SingleIndexer;

use serde_json::{json, Map, Value};

use crate::config::{EngineConfig, IndexingStrategy};
use crate::errors::SearchError;
use crate::interfaces::{SearchTransport, Searchable, SOFT_DELETED_FIELD};

/// The indexing strategy selected at construction.
#[derive(Debug, Clone)]
pub enum Indexer {
    Bulk(BulkIndexer),
    Single(SingleIndexer),
}

impl Indexer {
    pub fn from_config(config: &EngineConfig) -> Self {
        match config.indexer {
            IndexingStrategy::Bulk => Self::Bulk(BulkIndexer::new(config)),
            IndexingStrategy::Single => Self::Single(SingleIndexer::new(config)),
        }
    }

    pub fn strategy(&self) -> IndexingStrategy {
        match self {
            Self::Bulk(_) => IndexingStrategy::Bulk,
            Self::Single(_) => IndexingStrategy::Single,
        }
    }

    /// Write the models' documents. An empty batch sends nothing.
    pub async fn update<M: Searchable>(
        &self,
        transport: &dyn SearchTransport,
        models: &[M],
    ) -> Result<(), SearchError> {
        match self {
            Self::Bulk(indexer) => indexer.update(transport, models).await,
            Self::Single(indexer) => indexer.update(transport, models).await,
        }
    }

    /// Remove the models' documents. An empty batch sends nothing.
    pub async fn delete<M: Searchable>(
        &self,
        transport: &dyn SearchTransport,
        models: &[M],
    ) -> Result<(), SearchError> {
        match self {
            Self::Bulk(indexer) => indexer.delete(transport, models).await,
            Self::Single(indexer) => indexer.delete(transport, models).await,
        }
    }
}

/// Every model's key, or the first missing-key error.
pub(crate) fn require_keys<M: Searchable>(models: &[M]) -> Result<Vec<String>, SearchError> {
    models
        .iter()
        .map(|model| {
            model
                .search_key()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| SearchError::missing_key(M::searchable_as()))
        })
        .collect()
}

/// The model's document with soft-delete metadata merged in.
pub(crate) fn searchable_document<M: Searchable>(model: &M, soft_delete: bool) -> Map<String, Value> {
    let mut document = model.to_searchable_document();
    if soft_delete && M::uses_soft_delete() {
        let flag = if model.is_trashed() { 1 } else { 0 };
        document.insert(SOFT_DELETED_FIELD.to_string(), json!(flag));
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Post, Tag};

    #[test]
    fn test_from_config() {
        let config = EngineConfig::default().with_indexer(IndexingStrategy::Single);
        assert_eq!(Indexer::from_config(&config).strategy(), IndexingStrategy::Single);
        assert_eq!(
            Indexer::from_config(&EngineConfig::default()).strategy(),
            IndexingStrategy::Bulk
        );
    }

    #[test]
    fn test_require_keys() {
        let posts = vec![Post::new("1", "a"), Post::new("2", "b")];
        assert_eq!(require_keys(&posts).unwrap(), vec!["1", "2"]);

        let posts = vec![Post::new("1", "a"), Post::without_key("b")];
        assert!(matches!(
            require_keys(&posts),
            Err(SearchError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_soft_delete_metadata() {
        let post = Post::new("1", "a").trashed();

        let document = searchable_document(&post, true);
        assert_eq!(document[SOFT_DELETED_FIELD], json!(1));

        let document = searchable_document(&Post::new("2", "b"), true);
        assert_eq!(document[SOFT_DELETED_FIELD], json!(0));

        let document = searchable_document(&post, false);
        assert!(!document.contains_key(SOFT_DELETED_FIELD));
    }

    #[test]
    fn test_soft_delete_ignored_for_models_without_support() {
        let document = searchable_document(&Tag::new("7", "rust"), true);
        assert!(!document.contains_key(SOFT_DELETED_FIELD));
    }
}
