use crate::counter::StudentCounterRepository;
use crate::resource::ResourceRepository;
use async_trait::async_trait;
use btechverse_core::models::{NewResource, ResourceFilters, ResourceRecord};
use btechverse_core::AppError;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Resource repository backed by a map
#[derive(Clone, Default)]
pub struct InMemoryResourceRepository {
    records: Arc<Mutex<HashMap<Uuid, ResourceRecord>>>,
    fail_creates: Arc<AtomicBool>,
}

impl InMemoryResourceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is (bypasses id and timestamp assignment)
    pub fn insert(&self, record: ResourceRecord) {
        self.records.lock().unwrap().insert(record.id, record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    fn sorted_active(&self, keep: impl Fn(&ResourceRecord) -> bool) -> Vec<ResourceRecord> {
        let mut records: Vec<ResourceRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.is_active && keep(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn create(&self, resource: NewResource) -> Result<ResourceRecord, AppError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("metadata store unavailable".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        // Strictly increasing timestamps keep newest-first ordering stable
        let latest = records.values().map(|r| r.created_at).max();
        let now = Utc::now();
        let created_at = match latest {
            Some(latest) if latest >= now => latest + Duration::milliseconds(1),
            _ => now,
        };
        let record = ResourceRecord {
            id: Uuid::new_v4(),
            title: resource.title,
            branches: resource.branches,
            category: resource.category,
            subject: resource.subject,
            credit_name: resource.credit_name,
            file_url: resource.file_url,
            file_name: resource.file_name,
            file_size: resource.file_size,
            file_type: resource.file_type,
            uploaded_by: resource.uploaded_by,
            uploader_email: resource.uploader_email,
            download_count: 0,
            is_active: true,
            created_at,
        };
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResourceRecord>, AppError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.records.lock().unwrap().remove(&id).is_some())
    }

    async fn list(
        &self,
        filters: &ResourceFilters,
        limit: Option<i64>,
    ) -> Result<Vec<ResourceRecord>, AppError> {
        let mut records = self.sorted_active(|r| r.matches_filters(filters));
        if let Some(limit) = limit {
            records.truncate(limit.max(0) as usize);
        }
        Ok(records)
    }

    async fn search(
        &self,
        term: &str,
        filters: &ResourceFilters,
    ) -> Result<Vec<ResourceRecord>, AppError> {
        Ok(self.sorted_active(|r| r.matches_term(term) && r.matches_filters(filters)))
    }
}

/// Counter repository backed by a map
#[derive(Clone, Default)]
pub struct InMemoryCounterRepository {
    counters: Arc<Mutex<HashMap<String, i64>>>,
}

impl InMemoryCounterRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentCounterRepository for InMemoryCounterRepository {
    async fn increment(&self, name: &str) -> Result<i64, AppError> {
        let mut counters = self.counters.lock().unwrap();
        let value = counters.entry(name.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn get(&self, name: &str) -> Result<i64, AppError> {
        Ok(self
            .counters
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or(0))
    }
}
