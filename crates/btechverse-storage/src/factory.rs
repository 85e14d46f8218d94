#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageError, StorageResult};
use btechverse_core::Config;
use std::sync::Arc;

/// Create the storage backend described by configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    if config.s3_bucket().trim().is_empty() {
        return Err(StorageError::ConfigError(
            "S3_BUCKET not configured".to_string(),
        ));
    }

    #[cfg(feature = "storage-s3")]
    {
        let storage = S3Storage::new(
            config.s3_bucket().to_string(),
            config.s3_region().to_string(),
            config.s3_endpoint().map(String::from),
        )
        .await?;
        Ok(Arc::new(storage))
    }

    #[cfg(not(feature = "storage-s3"))]
    {
        Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        ))
    }
}
