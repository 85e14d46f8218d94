//! Admin uploads: validate, write the object, then write the metadata record.

use crate::auth::AdminAllowList;
use btechverse_core::models::{BatchUploadResult, Identity, NewResource, ResourceRecord};
use btechverse_core::{AppError, UploadValidator};
use btechverse_db::ResourceRepository;
use btechverse_storage::keys::{file_extension, upload_key};
use btechverse_storage::{LocatorError, Storage};
use chrono::Utc;
use std::sync::Arc;

/// Metadata shared by every file of an upload request.
#[derive(Debug, Clone, Default)]
pub struct ResourceUpload {
    pub title: String,
    pub branches: Vec<String>,
    pub category: String,
    pub subject: Option<String>,
    pub credit_name: Option<String>,
}

impl ResourceUpload {
    fn normalized(&self) -> ResourceUpload {
        let non_blank = |s: &Option<String>| {
            s.as_ref()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        ResourceUpload {
            title: self.title.trim().to_string(),
            branches: self
                .branches
                .iter()
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect(),
            category: self.category.trim().to_string(),
            subject: non_blank(&self.subject),
            credit_name: non_blank(&self.credit_name),
        }
    }
}

#[derive(Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

#[derive(Clone)]
pub struct UploadService {
    repository: Arc<dyn ResourceRepository>,
    storage: Arc<dyn Storage>,
    validator: UploadValidator,
    admins: AdminAllowList,
}

impl UploadService {
    pub fn new(
        repository: Arc<dyn ResourceRepository>,
        storage: Arc<dyn Storage>,
        validator: UploadValidator,
        admins: AdminAllowList,
    ) -> Self {
        Self {
            repository,
            storage,
            validator,
            admins,
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.validator.max_file_size()
    }

    /// Fails with `Forbidden` unless the caller may upload.
    pub fn authorize(&self, identity: &Identity) -> Result<(), AppError> {
        self.admins.require_admin(identity, "upload resources")
    }

    /// Upload one file and create its record.
    #[tracing::instrument(skip(self, identity, upload, file), fields(user_id = %identity.user_id, file_name = %file.file_name))]
    pub async fn upload(
        &self,
        identity: &Identity,
        upload: &ResourceUpload,
        file: UploadedFile,
    ) -> Result<ResourceRecord, AppError> {
        self.authorize(identity)?;
        let upload = upload.normalized();
        self.store(identity, &upload, file, Utc::now().timestamp_millis())
            .await
    }

    /// Upload several files sharing the same metadata. Each file succeeds or
    /// fails on its own; only the admin check fails the whole batch.
    #[tracing::instrument(skip(self, identity, upload, files), fields(user_id = %identity.user_id, file_count = files.len()))]
    pub async fn batch_upload(
        &self,
        identity: &Identity,
        upload: &ResourceUpload,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<BatchUploadResult>, AppError> {
        self.authorize(identity)?;
        let upload = upload.normalized();

        let mut results = Vec::with_capacity(files.len());
        let mut last_millis = 0;
        for file in files {
            // Keys embed the timestamp; keep it strictly increasing within a batch
            let millis = Utc::now().timestamp_millis().max(last_millis + 1);
            last_millis = millis;

            let file_name = file.file_name.clone();
            match self.store(identity, &upload, file, millis).await {
                Ok(record) => results.push(BatchUploadResult::succeeded(file_name, record.into())),
                Err(e) => {
                    tracing::warn!(file_name = %file_name, error = %e, "Batch entry failed");
                    results.push(BatchUploadResult::failed(file_name, e.to_string()));
                }
            }
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        tracing::info!(
            succeeded,
            failed = results.len() - succeeded,
            "Batch upload finished"
        );
        Ok(results)
    }

    async fn store(
        &self,
        identity: &Identity,
        upload: &ResourceUpload,
        file: UploadedFile,
        timestamp_millis: i64,
    ) -> Result<ResourceRecord, AppError> {
        self.validator
            .validate_fields(&upload.title, &upload.branches, &upload.category)?;
        self.validator
            .validate_all(&file.file_name, &file.content_type, file.data.len())?;

        let primary_branch = upload
            .branches
            .first()
            .ok_or_else(|| AppError::InvalidInput("Missing required field: branch".to_string()))?;
        let extension = file_extension(&file.file_name, &file.content_type);
        let key = upload_key(
            primary_branch,
            &upload.category,
            &upload.title,
            &extension,
            timestamp_millis,
        );
        let stored_name = key.rsplit('/').next().unwrap_or(&key).to_string();
        let file_size = file.data.len() as i64;

        let location = self
            .storage
            .upload_with_key(&key, file.data, &file.content_type)
            .await
            .map_err(LocatorError::from)?;

        let record = self
            .repository
            .create(NewResource {
                title: upload.title.clone(),
                branches: upload.branches.clone(),
                category: upload.category.clone(),
                subject: upload.subject.clone(),
                credit_name: upload.credit_name.clone(),
                file_url: location,
                file_name: stored_name,
                file_size,
                file_type: file.content_type.clone(),
                uploaded_by: identity.user_id.clone(),
                uploader_email: identity.email.clone(),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    key = %key,
                    error = %e,
                    "Metadata write failed after upload; stored object is orphaned"
                );
                e
            })?;

        tracing::info!(
            record_id = %record.id,
            key = %key,
            size_bytes = file_size,
            "Resource uploaded"
        );
        Ok(record)
    }
}
