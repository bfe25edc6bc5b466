//! Prepares the configured search index: creates it when missing and
//! raises its result window.

use search_driver::{telemetry, Dependencies, DriverError};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), DriverError> {
    telemetry::init()?;

    let dependencies = Dependencies::new().await.map_err(|e| {
        error!(error = %e, "Failed to initialize search driver");
        e
    })?;

    let config = dependencies.engine.config();
    info!(
        index = %config.index,
        max_result_window = config.max_result_window,
        "Search index ready"
    );

    Ok(())
}
