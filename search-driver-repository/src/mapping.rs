//! Mapping synchronization.
//!
//! Each model type's mapping is pushed before its first write and then
//! remembered for the lifetime of the synchronizer.

use std::collections::HashSet;

use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::SearchError;
use crate::interfaces::{SearchTransport, Searchable, SOFT_DELETED_FIELD};
use crate::payloads::Payload;

/// The mapping declared by `M`, plus the soft-delete field when enabled.
pub fn model_mapping<M: Searchable>(soft_delete: bool) -> Map<String, Value> {
    let mut mapping = M::mapping();

    if soft_delete && M::uses_soft_delete() {
        let properties = mapping
            .entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(properties) = properties {
            properties.insert(SOFT_DELETED_FIELD.to_string(), json!({ "type": "integer" }));
        }
    }

    mapping
}

/// Tracks which model types already had their mapping pushed.
#[derive(Debug, Default)]
pub struct MappingSync {
    synced: Mutex<HashSet<String>>,
}

impl MappingSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `M`'s mapping unless it was pushed before.
    ///
    /// Types without a mapping are remembered without a request. A failed
    /// push is not remembered, so the next write retries it.
    pub async fn ensure<M: Searchable>(
        &self,
        transport: &dyn SearchTransport,
        index: &str,
        soft_delete: bool,
    ) -> Result<(), SearchError> {
        let type_name = M::searchable_as();

        // Held across the push so concurrent writers push once.
        let mut synced = self.synced.lock().await;
        if synced.contains(&type_name) {
            return Ok(());
        }

        let mapping = model_mapping::<M>(soft_delete);
        if mapping.is_empty() {
            debug!(model = %type_name, "No mapping declared");
        } else {
            let mut payload = Payload::typed::<M>(index);
            payload.set("body", Value::Object(mapping));
            transport.put_mapping(payload.into_value()).await?;
            info!(model = %type_name, index = %index, "Pushed mapping");
        }

        synced.insert(type_name);
        Ok(())
    }

    pub async fn is_synced(&self, type_name: &str) -> bool {
        self.synced.lock().await.contains(type_name)
    }
}
