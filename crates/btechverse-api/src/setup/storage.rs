//! Storage setup and initialization

use anyhow::{Context, Result};
use btechverse_core::Config;
use btechverse_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing object storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize object storage")?;
    tracing::info!(
        bucket = %storage.bucket(),
        region = %config.s3_region(),
        endpoint = ?config.s3_endpoint(),
        "Object storage initialized"
    );
    Ok(storage)
}
