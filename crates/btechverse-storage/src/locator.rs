//! Resource locator.
//!
//! Turns a stored file reference into the key an object actually lives under,
//! then signs access URLs for it or deletes it. This is the only place that
//! knows about reference forms and encoding variants; callers never touch raw
//! keys.

use crate::keys::{encoding_variants, extract_key, EncodedKey, KeyError};
use crate::traits::{Storage, StorageError};
use btechverse_core::models::{AccessPurpose, FileStatus, ObjectMetadata, SignedAccessUrl};
use btechverse_core::AppError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Invalid storage reference: {0}")]
    InvalidReference(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Storage transport error: {0}")]
    Transport(String),
}

impl From<KeyError> for LocatorError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::InvalidReference(msg) => LocatorError::InvalidReference(msg),
        }
    }
}

impl From<StorageError> for LocatorError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => LocatorError::NotFound(key),
            StorageError::AccessDenied(msg) => LocatorError::AccessDenied(msg),
            StorageError::InvalidKey(msg) => LocatorError::InvalidReference(msg),
            other => LocatorError::Transport(other.to_string()),
        }
    }
}

impl From<LocatorError> for AppError {
    fn from(err: LocatorError) -> Self {
        match err {
            LocatorError::InvalidReference(msg) => AppError::InvalidReference(msg),
            LocatorError::NotFound(key) => {
                tracing::debug!(key = %key, "Stored file not found under any encoding");
                AppError::NotFound("File not found in storage".to_string())
            }
            LocatorError::AccessDenied(msg) => AppError::AccessDenied(msg),
            LocatorError::Transport(msg) => AppError::Transport(msg),
        }
    }
}

pub type LocatorResult<T> = Result<T, LocatorError>;

/// Resolves references to stored objects and issues access to them.
#[derive(Clone)]
pub struct ResourceLocator {
    storage: Arc<dyn Storage>,
    bucket: String,
}

impl ResourceLocator {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let bucket = storage.bucket().to_string();
        Self { storage, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Canonical key for a reference. Malformed URLs are `InvalidReference`.
    pub fn extract_key(&self, reference: &str) -> LocatorResult<String> {
        Ok(extract_key(reference, &self.bucket)?)
    }

    /// Probe the encoding variants of `key` in order and return the first one
    /// that exists. Stops at the first hit.
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn probe_variants(&self, key: &str) -> LocatorResult<Option<EncodedKey>> {
        for candidate in encoding_variants(key) {
            if self.storage.exists(&candidate.key).await? {
                tracing::debug!(
                    key = %candidate.key,
                    variant = candidate.variant.as_str(),
                    "Found stored object"
                );
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// The stored key for `key`, or `NotFound` if no variant exists.
    pub async fn resolve_existing_key(&self, key: &str) -> LocatorResult<String> {
        self.probe_variants(key)
            .await?
            .map(|found| found.key)
            .ok_or_else(|| LocatorError::NotFound(key.to_string()))
    }

    /// Sign a read URL for an already-resolved key.
    ///
    /// `Download` asks the backend to send `Content-Disposition: attachment`.
    /// Never mutates stored state; call again to re-derive an expired URL.
    pub async fn issue_access_url(
        &self,
        key: &str,
        purpose: AccessPurpose,
        ttl: Duration,
    ) -> LocatorResult<SignedAccessUrl> {
        let expires_at = Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64);
        let url = self
            .storage
            .get_presigned_url(key, ttl, purpose.content_disposition())
            .await?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            purpose = %purpose,
            ttl_secs = ttl.as_secs(),
            "Issued signed access URL"
        );

        Ok(SignedAccessUrl {
            url,
            key: key.to_string(),
            purpose,
            expires_at,
        })
    }

    /// Extract, resolve and sign in one step.
    pub async fn access_url_for_reference(
        &self,
        reference: &str,
        purpose: AccessPurpose,
        ttl: Duration,
    ) -> LocatorResult<SignedAccessUrl> {
        let key = self.extract_key(reference)?;
        let stored_key = self.resolve_existing_key(&key).await?;
        self.issue_access_url(&stored_key, purpose, ttl).await
    }

    /// Re-sign a previously issued (possibly expired) URL without probing.
    pub async fn refresh_access_url(
        &self,
        reference: &str,
        purpose: AccessPurpose,
        ttl: Duration,
    ) -> LocatorResult<SignedAccessUrl> {
        let key = self.extract_key(reference)?;
        self.issue_access_url(&key, purpose, ttl).await
    }

    pub async fn object_metadata(&self, key: &str) -> LocatorResult<ObjectMetadata> {
        Ok(self.storage.head(key).await?)
    }

    /// Diagnostic report on a reference: which variant exists and its metadata.
    pub async fn file_status(&self, reference: &str) -> LocatorResult<FileStatus> {
        let original_key = self.extract_key(reference)?;

        match self.probe_variants(&original_key).await? {
            Some(found) => {
                let metadata = self.object_metadata(&found.key).await?;
                Ok(FileStatus {
                    exists: true,
                    key: found.key,
                    key_type: Some(found.variant),
                    original_key,
                    metadata: Some(metadata),
                })
            }
            None => Ok(FileStatus {
                exists: false,
                key: original_key.clone(),
                key_type: None,
                original_key,
                metadata: None,
            }),
        }
    }

    /// Delete the object a reference points at. Returns the key removed.
    pub async fn delete_object(&self, reference: &str) -> LocatorResult<String> {
        let key = self.extract_key(reference)?;
        let stored_key = self.resolve_existing_key(&key).await?;
        self.storage.delete(&stored_key).await?;
        Ok(stored_key)
    }
}
