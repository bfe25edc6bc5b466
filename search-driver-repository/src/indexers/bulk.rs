//! Bulk indexing strategy.

use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use crate::config::{DocumentRefresh, EngineConfig};
use crate::errors::SearchError;
use crate::indexers::{require_keys, searchable_document};
use crate::interfaces::{SearchTransport, Searchable};
use crate::payloads::Payload;

/// Writes a whole batch with one bulk request.
#[derive(Debug, Clone)]
pub struct BulkIndexer {
    index: String,
    refresh: Option<DocumentRefresh>,
    soft_delete: bool,
}

impl BulkIndexer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            index: config.index.clone(),
            refresh: config.document_refresh,
            soft_delete: config.soft_delete,
        }
    }

    fn payload<M: Searchable>(&self) -> Payload {
        let mut payload = Payload::typed::<M>(&self.index);
        if let Some(refresh) = self.refresh {
            payload.set("refresh", refresh.as_str());
        }
        payload
    }

    /// Index every model with a non-empty document.
    #[instrument(skip(self, transport, models), fields(model = %M::searchable_as(), count = models.len()))]
    pub async fn update<M: Searchable>(
        &self,
        transport: &dyn SearchTransport,
        models: &[M],
    ) -> Result<(), SearchError> {
        if models.is_empty() {
            return Ok(());
        }

        let keys = require_keys(models)?;
        let mut payload = self.payload::<M>();
        let mut actions = 0;

        for (model, key) in models.iter().zip(keys) {
            let document = searchable_document(model, self.soft_delete);
            if document.is_empty() {
                debug!(key = %key, "Skipping model with empty document");
                continue;
            }

            payload
                .add("body", json!({ "index": { "_id": key } }))
                .add("body", Value::Object(document));
            actions += 1;
        }

        if actions == 0 {
            debug!("No documents to index");
            return Ok(());
        }

        let response = transport.bulk(payload.into_value()).await?;
        check_bulk_response(&response)?;

        debug!(actions = actions, "Bulk index completed");
        Ok(())
    }

    /// Delete every model's document.
    #[instrument(skip(self, transport, models), fields(model = %M::searchable_as(), count = models.len()))]
    pub async fn delete<M: Searchable>(
        &self,
        transport: &dyn SearchTransport,
        models: &[M],
    ) -> Result<(), SearchError> {
        if models.is_empty() {
            return Ok(());
        }

        let keys = require_keys(models)?;
        let mut payload = self.payload::<M>();
        for key in keys {
            payload.add("body", json!({ "delete": { "_id": key } }));
        }

        let response = transport.bulk(payload.into_value()).await?;
        check_bulk_response(&response)?;

        debug!("Bulk delete completed");
        Ok(())
    }
}

/// Turn a bulk response that reports item failures into one batch error.
pub(crate) fn check_bulk_response(response: &Value) -> Result<(), SearchError> {
    if !response
        .get("errors")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return Ok(());
    }

    let items = response
        .get("items")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    // Each item is `{ "<action>": { "_id": ..., "status": ..., "error": {...} } }`
    let failures: Vec<&Value> = items
        .iter()
        .filter_map(|item| item.as_object()?.values().next())
        .filter(|result| result.get("error").is_some())
        .collect();

    let first_reason = failures
        .first()
        .map(|result| {
            let id = match result.get("_id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => "?".to_string(),
            };
            let reason = result["error"]
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("unknown reason");
            format!("{}: {}", id, reason)
        })
        .unwrap_or_else(|| "unknown reason".to_string());

    error!(
        failed = failures.len(),
        total = items.len(),
        "Bulk request reported failed items"
    );

    Err(SearchError::bulk_index(format!(
        "{} of {} items failed, first failure {}",
        failures.len(),
        items.len(),
        first_reason
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, Post};
    use serde_json::json;

    fn indexer(config: EngineConfig) -> BulkIndexer {
        BulkIndexer::new(&config)
    }

    #[tokio::test]
    async fn test_update_builds_action_pairs() {
        let transport = MockTransport::new();
        let indexer = indexer(EngineConfig::new("models").with_document_refresh(DocumentRefresh::WaitFor));

        let posts = vec![Post::new("1", "First"), Post::new("2", "Second")];
        indexer.update(&transport, &posts).await.unwrap();

        let calls = transport.calls_to("bulk").await;
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            json!({
                "index": "models",
                "type": "posts",
                "refresh": "wait_for",
                "body": [
                    { "index": { "_id": "1" } },
                    { "title": "First" },
                    { "index": { "_id": "2" } },
                    { "title": "Second" }
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_update_skips_empty_documents() {
        let transport = MockTransport::new();
        let indexer = indexer(EngineConfig::default());

        let posts = vec![Post::new("1", ""), Post::new("2", "Second")];
        indexer.update(&transport, &posts).await.unwrap();

        let calls = transport.calls_to("bulk").await;
        let body = calls[0]["body"].as_array().unwrap();
        assert_eq!(body.len(), 2);
        assert_eq!(body[0], json!({ "index": { "_id": "2" } }));
    }

    #[tokio::test]
    async fn test_update_with_only_empty_documents_sends_nothing() {
        let transport = MockTransport::new();
        let indexer = indexer(EngineConfig::default());

        indexer
            .update(&transport, &[Post::new("1", "")])
            .await
            .unwrap();

        assert!(transport.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_soft_deleted_models_stay_indexed_with_flag() {
        let transport = MockTransport::new();
        let indexer = indexer(EngineConfig::default().with_soft_delete(true));

        indexer
            .update(&transport, &[Post::new("1", "Gone").trashed()])
            .await
            .unwrap();

        let calls = transport.calls_to("bulk").await;
        assert_eq!(
            calls[0]["body"][1],
            json!({ "title": "Gone", "__soft_deleted": 1 })
        );
    }

    #[tokio::test]
    async fn test_empty_batches_send_nothing() {
        let transport = MockTransport::new();
        let indexer = indexer(EngineConfig::default());

        indexer.update::<Post>(&transport, &[]).await.unwrap();
        indexer.delete::<Post>(&transport, &[]).await.unwrap();

        assert!(transport.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let transport = MockTransport::new();
        let indexer = indexer(EngineConfig::default());

        let posts = vec![Post::new("1", "a"), Post::without_key("b")];
        let result = indexer.update(&transport, &posts).await;

        assert!(matches!(result, Err(SearchError::MissingKey { .. })));
        assert!(transport.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_builds_header_only_lines() {
        let transport = MockTransport::new();
        let indexer = indexer(EngineConfig::default());

        indexer
            .delete(&transport, &[Post::new("1", "a"), Post::new("2", "")])
            .await
            .unwrap();

        let calls = transport.calls_to("bulk").await;
        assert_eq!(
            calls[0]["body"],
            json!([
                { "delete": { "_id": "1" } },
                { "delete": { "_id": "2" } }
            ])
        );
        assert!(calls[0].get("refresh").is_none());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let transport = MockTransport::failing("bulk");
        let indexer = indexer(EngineConfig::default());

        let result = indexer.update(&transport, &[Post::new("1", "a")]).await;
        assert!(matches!(result, Err(SearchError::BulkIndexError(_))));
    }

    #[test]
    fn test_check_bulk_response_ok() {
        assert!(check_bulk_response(&json!({ "errors": false, "items": [] })).is_ok());
        assert!(check_bulk_response(&json!({})).is_ok());
    }

    #[test]
    fn test_check_bulk_response_reports_failures() {
        let response = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "1", "status": 201 } },
                { "index": { "_id": "2", "status": 400, "error": { "type": "mapper_parsing_exception", "reason": "bad field" } } }
            ]
        });

        let err = check_bulk_response(&response).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bulk index error: 1 of 2 items failed, first failure 2: bad field"
        );
    }

    #[test]
    fn test_check_bulk_response_reports_numeric_ids() {
        let response = json!({
            "errors": true,
            "items": [
                { "index": { "_id": 7, "status": 400, "error": { "reason": "bad field" } } }
            ]
        });

        let err = check_bulk_response(&response).unwrap_err();
        assert!(matches!(err, SearchError::BulkIndexError(_)));
        assert!(err.to_string().ends_with("first failure 7: bad field"));
    }
}
