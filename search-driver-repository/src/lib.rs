//! # Search Driver Repository
//!
//! This crate indexes application models into a search engine and searches
//! them. It includes the payload builder, the bulk and single-document
//! indexers, the query engine, mapping synchronization and a concrete
//! transport for OpenSearch.

pub mod builder;
pub mod config;
pub mod engine;
pub mod errors;
pub mod indexers;
pub mod interfaces;
pub mod mapping;
pub mod opensearch;
pub mod payloads;
pub mod rules;

#[cfg(test)]
mod testing;

pub use builder::{QuerySpec, SearchBuilder, TrashedScope};
pub use config::{DocumentRefresh, EngineConfig, IndexingStrategy};
pub use engine::{ElasticEngine, ModelHit, PaginatedResults};
pub use errors::SearchError;
pub use indexers::{BulkIndexer, Indexer, SingleIndexer};
pub use interfaces::{ModelStore, SearchCallback, SearchRule, SearchTransport, Searchable};
pub use mapping::MappingSync;
pub use opensearch::OpenSearchTransport;
pub use payloads::{Payload, RawPayload};
pub use rules::{FuzzyRule, MatchAllRule, QueryStringRule, WildcardRule};
