//! Single-document indexing strategy.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::{DocumentRefresh, EngineConfig};
use crate::errors::SearchError;
use crate::indexers::{require_keys, searchable_document};
use crate::interfaces::{SearchTransport, Searchable};
use crate::payloads::Payload;

/// Writes each model with its own request.
#[derive(Debug, Clone)]
pub struct SingleIndexer {
    index: String,
    refresh: Option<DocumentRefresh>,
    soft_delete: bool,
}

impl SingleIndexer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            index: config.index.clone(),
            refresh: config.document_refresh,
            soft_delete: config.soft_delete,
        }
    }

    fn document_payload<M: Searchable>(&self, model: &M) -> Result<Payload, SearchError> {
        let mut payload = Payload::document(model, &self.index)?;
        if let Some(refresh) = self.refresh {
            payload.set("refresh", refresh.as_str());
        }
        Ok(payload)
    }

    #[instrument(skip(self, transport, models), fields(model = %M::searchable_as(), count = models.len()))]
    pub async fn update<M: Searchable>(
        &self,
        transport: &dyn SearchTransport,
        models: &[M],
    ) -> Result<(), SearchError> {
        require_keys(models)?;

        for model in models {
            let document = searchable_document(model, self.soft_delete);
            if document.is_empty() {
                debug!("Skipping model with empty document");
                continue;
            }

            let mut payload = self.document_payload(model)?;
            payload.set("body", Value::Object(document));
            transport.index(payload.into_value()).await?;
        }

        Ok(())
    }

    #[instrument(skip(self, transport, models), fields(model = %M::searchable_as(), count = models.len()))]
    pub async fn delete<M: Searchable>(
        &self,
        transport: &dyn SearchTransport,
        models: &[M],
    ) -> Result<(), SearchError> {
        require_keys(models)?;

        for model in models {
            let payload = self.document_payload(model)?;
            transport.delete(payload.into_value()).await?;
        }

        Ok(())
    }
}
