use crate::keys::{locator_reference, object_url};
use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use btechverse_core::models::ObjectMetadata;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Error codes S3 uses for permission and credential failures.
const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "Forbidden",
    "ExpiredToken",
    "TokenRefreshRequired",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
];

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(region.clone()));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config.clone())
            .load()
            .await;

        let client = if let Some(ref endpoint) = endpoint_url {
            // S3-compatible providers need path-style addressing
            let mut s3_config_builder = aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .endpoint_url(endpoint)
                .region(config.region().cloned())
                .retry_config(retry_config)
                .force_path_style(true);
            if let Some(provider) = config.credentials_provider() {
                s3_config_builder = s3_config_builder.credentials_provider(provider);
            }
            Client::from_conf(s3_config_builder.build())
        } else {
            Client::new(&config)
        };

        tracing::info!(
            bucket = %bucket,
            region = %region,
            endpoint = ?endpoint_url,
            "S3 storage initialized"
        );

        Ok(S3Storage {
            client,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Stored reference of an uploaded object
    fn generate_url(&self, key: &str) -> String {
        stored_location(&self.bucket, &self.region, self.endpoint_url.as_deref(), key)
    }
}

/// Reference recorded for an uploaded object.
///
/// Custom endpoints get an `s3://bucket/key` locator; their URLs carry no
/// provider domain and would not read back as a key.
fn stored_location(bucket: &str, region: &str, endpoint_url: Option<&str>, key: &str) -> String {
    match endpoint_url {
        Some(_) => locator_reference(bucket, key),
        None => object_url(bucket, region, key),
    }
}

/// Permission or credential failure, judged by status code, error code, or
/// (for signing, which never reaches S3) the error text.
fn is_access_denied<E>(err: &SdkError<E, HttpResponse>) -> bool
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    if err
        .raw_response()
        .is_some_and(|response| response.status().as_u16() == 403)
    {
        return true;
    }
    if err
        .code()
        .is_some_and(|code| ACCESS_DENIED_CODES.contains(&code))
    {
        return true;
    }
    let text = DisplayErrorContext(err).to_string().to_lowercase();
    text.contains("credential") || text.contains("expired")
}

fn is_not_found<E>(err: &SdkError<E, HttpResponse>) -> bool {
    err.raw_response()
        .is_some_and(|response| response.status().as_u16() == 404)
}

fn classify<E>(err: SdkError<E, HttpResponse>, key: &str) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    if is_access_denied(&err) {
        StorageError::AccessDenied(format!("{}: {}", key, DisplayErrorContext(&err)))
    } else if is_not_found(&err) {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::BackendError(DisplayErrorContext(&err).to_string())
    }
}

fn to_chrono(value: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(value.secs(), value.subsec_nanos())
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let size = data.len() as u64;
        let body = ByteStream::from(Bytes::from(data));
        let start = std::time::Instant::now();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %storage_key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                if is_access_denied(&e) {
                    StorageError::AccessDenied(storage_key.to_string())
                } else {
                    StorageError::UploadFailed(DisplayErrorContext(&e).to_string())
                }
            })?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                if is_access_denied(&e) {
                    StorageError::AccessDenied(storage_key.to_string())
                } else {
                    StorageError::DeleteFailed(DisplayErrorContext(&e).to_string())
                }
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => match &e {
                SdkError::ServiceError(service_err)
                    if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
                {
                    Ok(false)
                }
                _ if is_not_found(&e) => Ok(false),
                _ => Err(classify(e, storage_key)),
            },
        }
    }

    async fn head(&self, storage_key: &str) -> StorageResult<ObjectMetadata> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(service_err)
                    if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
                {
                    StorageError::NotFound(storage_key.to_string())
                }
                _ => classify(e, storage_key),
            })?;

        Ok(ObjectMetadata {
            size: output.content_length(),
            last_modified: output.last_modified().and_then(to_chrono),
            content_type: output.content_type().map(String::from),
            etag: output.e_tag().map(String::from),
        })
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
        content_disposition: Option<&str>,
    ) -> StorageResult<String> {
        let presigning_config = PresigningConfig::builder()
            .expires_in(expires_in)
            .build()
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let mut request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(storage_key);
        if let Some(disposition) = content_disposition {
            request = request.response_content_disposition(disposition);
        }

        let presigned_request = request.presigned(presigning_config).await.map_err(|e| {
            tracing::warn!(
                error = %DisplayErrorContext(&e),
                bucket = %self.bucket,
                key = %storage_key,
                "S3 presign failed"
            );
            classify(e, storage_key)
        })?;

        Ok(presigned_request.uri().to_string())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
