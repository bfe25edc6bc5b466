//! Dependency initialization and wiring for the search driver.

use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::DriverError;
use search_driver_repository::{ElasticEngine, OpenSearchTransport, SearchTransport};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The connected engine, with its index ready.
    pub engine: ElasticEngine,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`Settings::from_env`] for the variables read.
    pub async fn new() -> Result<Self, DriverError> {
        Self::from_settings(Settings::from_env()?).await
    }

    /// Connect an OpenSearch-backed engine with the given settings.
    ///
    /// Creates the index if it is missing and raises its result window.
    ///
    /// # Arguments
    ///
    /// * `settings` - The engine URL and engine configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - The wired dependencies
    /// * `Err(DriverError::ConfigError)` - If the engine URL is invalid
    /// * `Err(DriverError)` - If the engine cannot prepare its index
    pub async fn from_settings(settings: Settings) -> Result<Self, DriverError> {
        info!(
            engine_url = %settings.engine_url,
            index = %settings.engine.index,
            indexer = %settings.engine.indexer,
            soft_delete = settings.engine.soft_delete,
            "Initializing dependencies"
        );

        let transport = OpenSearchTransport::new(&settings.engine_url).map_err(|e| {
            DriverError::config(format!("Failed to create OpenSearch transport: {}", e))
        })?;

        Self::with_transport(Arc::new(transport), settings).await
    }

    /// Connect an engine over an already built transport.
    pub async fn with_transport(
        transport: Arc<dyn SearchTransport>,
        settings: Settings,
    ) -> Result<Self, DriverError> {
        let engine = ElasticEngine::connect(transport, settings.engine).await?;

        info!("Search engine connection verified");

        Ok(Self { engine })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use search_driver_repository::{EngineConfig, SearchError};
    use serde_json::{json, Value};
    use tokio::sync::Mutex;

    /// Transport for a cluster with no indices.
    #[derive(Default)]
    struct EmptyCluster {
        created: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl SearchTransport for EmptyCluster {
        async fn index_exists(&self, _index: &str) -> Result<bool, SearchError> {
            Ok(false)
        }

        async fn create_index(&self, payload: Value) -> Result<(), SearchError> {
            self.created.lock().await.push(payload);
            Ok(())
        }

        async fn get_settings(&self, index: &str) -> Result<Value, SearchError> {
            Ok(json!({ index: { "settings": { "index": { "max_result_window": "200000" } } } }))
        }

        async fn put_settings(&self, _payload: Value) -> Result<(), SearchError> {
            Ok(())
        }

        async fn put_mapping(&self, _payload: Value) -> Result<(), SearchError> {
            Ok(())
        }

        async fn bulk(&self, _payload: Value) -> Result<Value, SearchError> {
            Ok(json!({ "errors": false, "items": [] }))
        }

        async fn index(&self, _payload: Value) -> Result<(), SearchError> {
            Ok(())
        }

        async fn delete(&self, _payload: Value) -> Result<(), SearchError> {
            Ok(())
        }

        async fn search(&self, _payload: Value) -> Result<Value, SearchError> {
            Ok(json!({ "hits": { "total": 0, "hits": [] } }))
        }

        async fn count(&self, _payload: Value) -> Result<Value, SearchError> {
            Ok(json!({ "count": 0 }))
        }
    }

    #[tokio::test]
    async fn test_with_transport_prepares_index() {
        let transport = Arc::new(EmptyCluster::default());
        let settings = Settings {
            engine_url: "http://localhost:9200".to_string(),
            engine: EngineConfig::new("catalog").with_prefix("test_"),
        };

        let dependencies = Dependencies::with_transport(transport.clone(), settings)
            .await
            .unwrap();

        assert_eq!(dependencies.engine.config().index, "test_catalog");
        let created = transport.created.lock().await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0]["index"], "test_catalog");
    }

    #[tokio::test]
    async fn test_invalid_url_is_config_error() {
        let settings = Settings {
            engine_url: "::not a url::".to_string(),
            engine: EngineConfig::default(),
        };

        let result = Dependencies::from_settings(settings).await;
        assert!(matches!(result, Err(DriverError::ConfigError(_))));
    }
}
