//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use btechverse_core::models::ObjectMetadata;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Keys passed here are raw object keys: no decoding or variant handling
/// happens at this level. That is the locator's job.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload data to a specific storage key. Returns the object's location URL.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Delete a file by its storage key
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists. A missing object is `Ok(false)`, not an error.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Metadata-only lookup. Missing objects yield `StorageError::NotFound`.
    async fn head(&self, storage_key: &str) -> StorageResult<ObjectMetadata>;

    /// Generate a presigned GET URL, optionally asking the backend to send a
    /// `Content-Disposition` response header.
    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
        content_disposition: Option<&str>,
    ) -> StorageResult<String>;

    /// Bucket the backend reads from and writes to.
    fn bucket(&self) -> &str;
}
