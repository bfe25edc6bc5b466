//! OpenSearch transport implementation.
//!
//! This module provides the concrete implementation of `SearchTransport`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{
        IndicesCreateParts, IndicesExistsParts, IndicesGetSettingsParts, IndicesPutMappingParts,
        IndicesPutSettingsParts,
    },
    BulkParts, CountParts, DeleteParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::SearchTransport;
use crate::opensearch::request;

/// OpenSearch transport.
///
/// Payloads may carry a `type` for mapping bookkeeping; it is not sent,
/// since the engine has a single mapping per index.
///
/// # Example
///
/// ```ignore
/// let transport = OpenSearchTransport::new("http://localhost:9200")?;
/// let engine = ElasticEngine::connect(Arc::new(transport), EngineConfig::default()).await?;
/// ```
pub struct OpenSearchTransport {
    client: OpenSearch,
}

impl OpenSearchTransport {
    /// Create a transport for a single node at `url`.
    ///
    /// No request is sent until the first call.
    ///
    /// # Arguments
    ///
    /// * `url` - The node URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchTransport)` - A transport for the node
    /// * `Err(SearchError::ConnectionError)` - If the URL is invalid or the transport cannot be built
    pub fn new(url: &str) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(url = %url, "Created OpenSearch transport");

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }
}

/// Turn a non-success response into `to_error`, logging the body.
async fn ensure_success(
    response: Response,
    operation: &str,
    to_error: fn(String) -> SearchError,
) -> Result<Response, SearchError> {
    let status = response.status_code();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    error!(operation = operation, status = %status, body = %error_body, "Request failed");
    Err(to_error(format!(
        "{} failed with status {}: {}",
        operation, status, error_body
    )))
}

async fn read_json(response: Response) -> Result<Value, SearchError> {
    response
        .json::<Value>()
        .await
        .map_err(|e| SearchError::parse(e.to_string()))
}

#[async_trait]
impl SearchTransport for OpenSearchTransport {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        // 404 means the index is missing
        if response.status_code().as_u16() == 404 {
            return Ok(false);
        }
        ensure_success(response, "index_exists", SearchError::IndexCreationError).await?;
        Ok(true)
    }

    #[instrument(skip(self, payload))]
    async fn create_index(&self, payload: Value) -> Result<(), SearchError> {
        let index = request::field(&payload, "index")?;

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&index))
            .body(request::body(&payload))
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        ensure_success(response, "create_index", SearchError::IndexCreationError).await?;
        debug!(index = %index, "Index created");
        Ok(())
    }

    async fn get_settings(&self, index: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .indices()
            .get_settings(IndicesGetSettingsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::settings(e.to_string()))?;

        let response = ensure_success(response, "get_settings", SearchError::SettingsError).await?;
        read_json(response).await
    }

    async fn put_settings(&self, payload: Value) -> Result<(), SearchError> {
        let index = request::field(&payload, "index")?;

        let response = self
            .client
            .indices()
            .put_settings(IndicesPutSettingsParts::Index(&[&index]))
            .body(request::body(&payload))
            .send()
            .await
            .map_err(|e| SearchError::settings(e.to_string()))?;

        ensure_success(response, "put_settings", SearchError::SettingsError).await?;
        Ok(())
    }

    async fn put_mapping(&self, payload: Value) -> Result<(), SearchError> {
        let index = request::field(&payload, "index")?;

        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[&index]))
            .body(request::body(&payload))
            .send()
            .await
            .map_err(|e| SearchError::mapping(e.to_string()))?;

        ensure_success(response, "put_mapping", SearchError::MappingError).await?;
        Ok(())
    }

    #[instrument(skip(self, payload))]
    async fn bulk(&self, payload: Value) -> Result<Value, SearchError> {
        let index = request::field(&payload, "index")?;
        let lines = request::bulk_lines(&payload)?;
        let line_count = lines.len();

        let mut bulk = self.client.bulk(BulkParts::Index(&index)).body(lines);
        if let Some(refresh) = request::refresh(&payload) {
            bulk = bulk.refresh(refresh);
        }

        let response = bulk
            .send()
            .await
            .map_err(|e| SearchError::bulk_index(e.to_string()))?;

        let response = ensure_success(response, "bulk", SearchError::BulkIndexError).await?;
        debug!(index = %index, lines = line_count, "Bulk request sent");
        read_json(response).await
    }

    async fn index(&self, payload: Value) -> Result<(), SearchError> {
        let index = request::field(&payload, "index")?;
        let id = request::field(&payload, "id")?;

        let mut call = self
            .client
            .index(IndexParts::IndexId(&index, &id))
            .body(request::body(&payload));
        if let Some(refresh) = request::refresh(&payload) {
            call = call.refresh(refresh);
        }

        let response = call
            .send()
            .await
            .map_err(|e| SearchError::index(e.to_string()))?;

        ensure_success(response, "index", SearchError::IndexError).await?;
        debug!(doc_id = %id, "Document indexed");
        Ok(())
    }

    async fn delete(&self, payload: Value) -> Result<(), SearchError> {
        let index = request::field(&payload, "index")?;
        let id = request::field(&payload, "id")?;

        let mut call = self.client.delete(DeleteParts::IndexId(&index, &id));
        if let Some(refresh) = request::refresh(&payload) {
            call = call.refresh(refresh);
        }

        let response = call
            .send()
            .await
            .map_err(|e| SearchError::delete(e.to_string()))?;

        ensure_success(response, "delete", SearchError::DeleteError).await?;
        debug!(doc_id = %id, "Document deleted");
        Ok(())
    }

    async fn search(&self, payload: Value) -> Result<Value, SearchError> {
        let index = request::field(&payload, "index")?;

        let response = self
            .client
            .search(SearchParts::Index(&[&index]))
            .body(request::body(&payload))
            .send()
            .await
            .map_err(|e| SearchError::query(e.to_string()))?;

        let response = ensure_success(response, "search", SearchError::QueryError).await?;
        read_json(response).await
    }

    async fn count(&self, payload: Value) -> Result<Value, SearchError> {
        let index = request::field(&payload, "index")?;

        let response = self
            .client
            .count(CountParts::Index(&[&index]))
            .body(request::body(&payload))
            .send()
            .await
            .map_err(|e| SearchError::query(e.to_string()))?;

        let response = ensure_success(response, "count", SearchError::QueryError).await?;
        read_json(response).await
    }
}
