//! # Search Driver
//!
//! Entry crate for the search driver.
//!
//! This crate loads the driver settings from the environment, initialises
//! tracing and wires the OpenSearch transport into an `ElasticEngine`.

pub mod config;
pub mod telemetry;

pub use config::{Dependencies, Settings};
pub use search_driver_repository as repository;
pub use search_driver_shared as shared;

use thiserror::Error;

/// Errors that can occur during driver initialization.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] search_driver_repository::SearchError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DriverError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
