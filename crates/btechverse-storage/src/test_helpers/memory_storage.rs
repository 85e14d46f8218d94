//! In-memory Storage implementation for testing

use crate::keys::encode_key_path;
use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use btechverse_core::models::ObjectMetadata;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// Storage that keeps objects in a map and records every existence probe.
pub struct MemoryStorage {
    bucket: String,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    probes: Arc<Mutex<Vec<String>>>,
    signatures: AtomicU64,
    fail_probes: AtomicBool,
    deny_access: AtomicBool,
    fail_deletes: AtomicBool,
    fail_uploads: AtomicBool,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(Mutex::new(HashMap::new())),
            probes: Arc::new(Mutex::new(Vec::new())),
            signatures: AtomicU64::new(0),
            fail_probes: AtomicBool::new(false),
            deny_access: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_uploads: AtomicBool::new(false),
        }
    }

    /// Store an object under an exact key
    pub fn put(&self, key: &str, data: &[u8]) {
        self.put_with_type(key, data, "application/octet-stream");
    }

    pub fn put_with_type(&self, key: &str, data: &[u8], content_type: &str) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
    }

    /// Remove an object behind the application's back
    pub fn remove(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Keys passed to `exists`, in call order
    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }

    /// Make existence probes fail with a backend error
    pub fn fail_probes(&self, fail: bool) {
        self.fail_probes.store(fail, Ordering::SeqCst);
    }

    /// Make every call fail with an access-denied error
    pub fn deny_access(&self, deny: bool) {
        self.deny_access.store(deny, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Follow a URL issued by `get_presigned_url` back to the object bytes
    pub fn resolve_signed_url(&self, url: &str) -> Option<Vec<u8>> {
        let prefix = format!("https://{}.s3.memory.amazonaws.com/", self.bucket);
        let rest = url.strip_prefix(&prefix)?;
        let path = rest.split('?').next()?;
        let key = urlencoding::decode(path).ok()?;
        self.objects
            .lock()
            .unwrap()
            .get(key.as_ref())
            .map(|object| object.data.clone())
    }

    fn check_access(&self, key: &str) -> StorageResult<()> {
        if self.deny_access.load(Ordering::SeqCst) {
            return Err(StorageError::AccessDenied(key.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        self.check_access(storage_key)?;
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(storage_key.to_string()));
        }
        self.put_with_type(storage_key, &data, content_type);
        Ok(format!(
            "https://{}.s3.memory.amazonaws.com/{}",
            self.bucket,
            encode_key_path(storage_key)
        ))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.check_access(storage_key)?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(storage_key.to_string()));
        }
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.probes.lock().unwrap().push(storage_key.to_string());
        self.check_access(storage_key)?;
        if self.fail_probes.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("connection reset".to_string()));
        }
        Ok(self.contains(storage_key))
    }

    async fn head(&self, storage_key: &str) -> StorageResult<ObjectMetadata> {
        self.check_access(storage_key)?;
        let objects = self.objects.lock().unwrap();
        let object = objects
            .get(storage_key)
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))?;
        Ok(ObjectMetadata {
            size: Some(object.data.len() as i64),
            last_modified: Some(object.last_modified),
            content_type: Some(object.content_type.clone()),
            etag: Some(format!("\"{:x}\"", object.data.len())),
        })
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
        content_disposition: Option<&str>,
    ) -> StorageResult<String> {
        self.check_access(storage_key)?;
        let signature = self.signatures.fetch_add(1, Ordering::SeqCst);
        let mut url = format!(
            "https://{}.s3.memory.amazonaws.com/{}?X-Amz-Expires={}&X-Amz-Signature={:016x}",
            self.bucket,
            encode_key_path(storage_key),
            expires_in.as_secs(),
            signature
        );
        if let Some(disposition) = content_disposition {
            url.push_str("&response-content-disposition=");
            url.push_str(disposition);
        }
        Ok(url)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
