//! Signed view/download access to stored resources.

use btechverse_core::models::{AccessPurpose, FileStatus, SignedAccessUrl};
use btechverse_core::AppError;
use btechverse_db::ResourceRepository;
use btechverse_storage::ResourceLocator;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone)]
pub struct AccessService {
    repository: Arc<dyn ResourceRepository>,
    locator: ResourceLocator,
    ttl: Duration,
}

impl AccessService {
    pub fn new(
        repository: Arc<dyn ResourceRepository>,
        locator: ResourceLocator,
        ttl: Duration,
    ) -> Self {
        Self {
            repository,
            locator,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn reference_for(&self, id: Uuid) -> Result<String, AppError> {
        let record = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {}", id)))?;
        if record.file_url.trim().is_empty() {
            return Err(AppError::InvalidReference(format!(
                "Resource {} has no stored file",
                id
            )));
        }
        Ok(record.file_url)
    }

    /// Resolve the record's stored object and sign a URL for it.
    #[tracing::instrument(skip(self), fields(ttl_secs = self.ttl.as_secs()))]
    pub async fn access_url(
        &self,
        id: Uuid,
        purpose: AccessPurpose,
    ) -> Result<SignedAccessUrl, AppError> {
        let reference = self.reference_for(id).await?;
        Ok(self
            .locator
            .access_url_for_reference(&reference, purpose, self.ttl)
            .await?)
    }

    pub async fn view_url(&self, id: Uuid) -> Result<SignedAccessUrl, AppError> {
        self.access_url(id, AccessPurpose::View).await
    }

    pub async fn download_url(&self, id: Uuid) -> Result<SignedAccessUrl, AppError> {
        self.access_url(id, AccessPurpose::Download).await
    }

    pub async fn file_status(&self, id: Uuid) -> Result<FileStatus, AppError> {
        let reference = self.reference_for(id).await?;
        Ok(self.locator.file_status(&reference).await?)
    }

    /// Re-sign any previously issued URL or stored reference.
    #[tracing::instrument(skip(self, reference))]
    pub async fn refresh(
        &self,
        reference: &str,
        purpose: AccessPurpose,
    ) -> Result<SignedAccessUrl, AppError> {
        Ok(self
            .locator
            .refresh_access_url(reference, purpose, self.ttl)
            .await?)
    }
}
