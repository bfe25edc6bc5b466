//! Driver settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use search_driver_repository::config::{DEFAULT_INDEX, DEFAULT_MAX_RESULT_WINDOW};
use search_driver_repository::{DocumentRefresh, EngineConfig, IndexingStrategy};

use crate::DriverError;

/// Default search engine URL.
const DEFAULT_ENGINE_URL: &str = "http://localhost:9200";

/// Settings for one driver instance.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Search engine URL.
    pub engine_url: String,
    /// Engine configuration, with the index prefix already applied.
    pub engine: EngineConfig,
}

impl Settings {
    /// Load settings from the process environment, reading `.env` first.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_ENGINE_URL`: search engine URL (default: http://localhost:9200)
    /// - `SEARCH_INDEX`: index name (default: models)
    /// - `SEARCH_INDEX_PREFIX`: prepended to the index name (default: none)
    /// - `SEARCH_MAX_RESULT_WINDOW`: minimum result window (default: 200000)
    /// - `SEARCH_DOCUMENT_REFRESH`: `true`, `false` or `wait_for` (default: unset)
    /// - `SEARCH_SOFT_DELETE`: track soft deletes (default: false)
    /// - `SEARCH_INDEXER`: `bulk` or `single` (default: bulk)
    /// - `SEARCH_UPDATE_MAPPING`: push mappings before writes (default: true)
    pub fn from_env() -> Result<Self, DriverError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DriverError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let engine_url = var("SEARCH_ENGINE_URL").unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string());
        let index = var("SEARCH_INDEX").unwrap_or_else(|| DEFAULT_INDEX.to_string());

        let mut engine = EngineConfig::new(index)
            .with_max_result_window(
                parse(&var, "SEARCH_MAX_RESULT_WINDOW")?.unwrap_or(DEFAULT_MAX_RESULT_WINDOW),
            )
            .with_soft_delete(parse_flag(&var, "SEARCH_SOFT_DELETE")?.unwrap_or(false))
            .with_indexer(parse::<IndexingStrategy>(&var, "SEARCH_INDEXER")?.unwrap_or_default())
            .with_update_mapping(parse_flag(&var, "SEARCH_UPDATE_MAPPING")?.unwrap_or(true));

        if let Some(refresh) = parse::<DocumentRefresh>(&var, "SEARCH_DOCUMENT_REFRESH")? {
            engine = engine.with_document_refresh(refresh);
        }
        if let Some(prefix) = var("SEARCH_INDEX_PREFIX") {
            engine = engine.with_prefix(&prefix);
        }

        Ok(Self { engine_url, engine })
    }
}

fn parse<T>(var: impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, DriverError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| DriverError::config(format!("invalid {}: {}", name, e)))
        })
        .transpose()
}

fn parse_flag(var: impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<bool>, DriverError> {
    var(name)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(DriverError::config(format!(
                "invalid {}: expected a boolean, got '{}'",
                name, other
            ))),
        })
        .transpose()
}
