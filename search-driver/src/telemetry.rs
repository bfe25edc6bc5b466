//! Tracing initialization.

use std::env;

use tracing_subscriber::EnvFilter;

use crate::DriverError;

/// Log output format, selected with `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `json` selects JSON lines; anything else is human-readable text.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(|n| n.trim().to_ascii_lowercase()) {
            Some(n) if n == "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Install the global subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init() -> Result<(), DriverError> {
    init_with_format(LogFormat::from_name(env::var("LOG_FORMAT").ok().as_deref()))
}

pub fn init_with_format(format: LogFormat) -> Result<(), DriverError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    result.map_err(|e| DriverError::config(format!("Failed to initialize tracing: {}", e)))
}
