//! Browsing, search, stats and deletion of study resources.

use crate::auth::AdminAllowList;
use btechverse_core::constants::{DEFAULT_RECENT_LIMIT, INTERVIEW_PREP_BRANCH, STATS_RECENT_LIMIT};
use btechverse_core::models::{
    DeleteOutcome, Identity, ResourceFilters, ResourceRecord, ResourceResponse, ResourceStats,
};
use btechverse_core::AppError;
use btechverse_db::ResourceRepository;
use btechverse_storage::ResourceLocator;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ResourceService {
    repository: Arc<dyn ResourceRepository>,
    locator: ResourceLocator,
    admins: AdminAllowList,
}

impl ResourceService {
    pub fn new(
        repository: Arc<dyn ResourceRepository>,
        locator: ResourceLocator,
        admins: AdminAllowList,
    ) -> Self {
        Self {
            repository,
            locator,
            admins,
        }
    }

    pub async fn list(
        &self,
        filters: &ResourceFilters,
        limit: Option<usize>,
    ) -> Result<Vec<ResourceRecord>, AppError> {
        self.repository
            .list(filters, limit.map(|l| l as i64))
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<ResourceRecord>, AppError> {
        self.list(&ResourceFilters::default(), None).await
    }

    pub async fn list_by_branch(&self, branch: &str) -> Result<Vec<ResourceRecord>, AppError> {
        let filters = ResourceFilters {
            branch: Some(branch.to_string()),
            category: None,
        };
        self.list(&filters, None).await
    }

    pub async fn list_by_category(
        &self,
        branch: &str,
        category: &str,
    ) -> Result<Vec<ResourceRecord>, AppError> {
        let filters = ResourceFilters {
            branch: Some(branch.to_string()),
            category: Some(category.to_string()),
        };
        self.list(&filters, None).await
    }

    /// Newest uploads across all branches; `limit` defaults to 10.
    pub async fn list_recent(&self, limit: Option<usize>) -> Result<Vec<ResourceRecord>, AppError> {
        self.list(
            &ResourceFilters::default(),
            Some(limit.unwrap_or(DEFAULT_RECENT_LIMIT)),
        )
        .await
    }

    pub async fn list_interview_prep(&self) -> Result<Vec<ResourceRecord>, AppError> {
        self.list_by_branch(INTERVIEW_PREP_BRANCH).await
    }

    /// Case-insensitive match on title, subject or credit name, then filters.
    /// A blank term lists everything the filters allow.
    pub async fn search(
        &self,
        term: &str,
        filters: &ResourceFilters,
    ) -> Result<Vec<ResourceRecord>, AppError> {
        if term.trim().is_empty() {
            return self.list(filters, None).await;
        }
        self.repository.search(term, filters).await
    }

    pub async fn get(&self, id: Uuid) -> Result<ResourceRecord, AppError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {}", id)))
    }

    #[tracing::instrument(skip(self))]
    pub async fn stats(&self) -> Result<ResourceStats, AppError> {
        let records = self.list_all().await?;

        let mut by_branch: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        for record in &records {
            for branch in &record.branches {
                *by_branch.entry(branch.clone()).or_default() += 1;
            }
            *by_category.entry(record.category.clone()).or_default() += 1;
        }

        let total = records.len();
        let recent_uploads = records
            .into_iter()
            .take(STATS_RECENT_LIMIT)
            .map(ResourceResponse::from)
            .collect();

        Ok(ResourceStats {
            total,
            by_branch,
            by_category,
            recent_uploads,
        })
    }

    /// Delete a resource: the metadata record first, then the stored object.
    ///
    /// Once the record is deleted the resource is gone. A failure to delete the
    /// object is logged and reported in the outcome, never returned as an
    /// error, and the record is not restored.
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn delete_resource(
        &self,
        identity: &Identity,
        record_id: Uuid,
    ) -> Result<DeleteOutcome, AppError> {
        self.admins.require_admin(identity, "delete resources")?;

        let record = self.get(record_id).await?;
        if !self.repository.delete(record_id).await? {
            return Err(AppError::NotFound(format!("Resource {}", record_id)));
        }
        tracing::info!(record_id = %record_id, "Resource metadata deleted");

        let object_deleted = if record.file_url.trim().is_empty() {
            false
        } else {
            match self.locator.delete_object(&record.file_url).await {
                Ok(key) => {
                    tracing::info!(record_id = %record_id, key = %key, "Stored object deleted");
                    true
                }
                Err(e) => {
                    tracing::warn!(
                        record_id = %record_id,
                        reference = %record.file_url,
                        error = %e,
                        "Stored object not deleted; metadata deletion stands"
                    );
                    false
                }
            }
        };

        Ok(DeleteOutcome {
            record_id,
            object_deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use btechverse_core::models::NewResource;
    use btechverse_db::test_helpers::InMemoryResourceRepository;
    use btechverse_storage::keys::object_url;
    use btechverse_storage::test_helpers::MemoryStorage;
    use btechverse_storage::Storage;

    const ADMIN: &str = "admin@btechverse.com";

    struct Fixture {
        repository: Arc<InMemoryResourceRepository>,
        storage: Arc<MemoryStorage>,
        service: ResourceService,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryResourceRepository::new());
        let storage = Arc::new(MemoryStorage::new("btech-verse"));
        let service = ResourceService::new(
            repository.clone() as Arc<dyn ResourceRepository>,
            ResourceLocator::new(storage.clone() as Arc<dyn Storage>),
            AdminAllowList::new([ADMIN]),
        );
        Fixture {
            repository,
            storage,
            service,
        }
    }

    fn new_resource(title: &str, branches: &[&str], category: &str, key: &str) -> NewResource {
        NewResource {
            title: title.to_string(),
            branches: branches.iter().map(|b| b.to_string()).collect(),
            category: category.to_string(),
            subject: None,
            credit_name: None,
            file_url: object_url("btech-verse", "eu-north-1", key),
            file_name: "file.pdf".to_string(),
            file_size: 100,
            file_type: "application/pdf".to_string(),
            uploaded_by: "uid-admin".to_string(),
            uploader_email: ADMIN.to_string(),
        }
    }

    fn admin() -> Identity {
        Identity::new("uid-admin", "Admin@BTechVerse.com")
    }

    async fn seed(f: &Fixture) -> Vec<ResourceRecord> {
        let mut records = Vec::new();
        for (title, branches, category) in [
            ("DBMS Notes", vec!["CSE", "IT"], "Notes"),
            ("Signals", vec!["ECE"], "Notes"),
            ("OS Paper", vec!["CSE"], "Papers"),
            ("Aptitude", vec![INTERVIEW_PREP_BRANCH], "Guides"),
        ] {
            let key = format!("resources/{}/{}/1_{}.pdf", branches[0], category, title);
            f.storage.put(&key, b"pdf");
            records.push(
                f.repository
                    .create(new_resource(title, &branches, category, &key))
                    .await
                    .unwrap(),
            );
        }
        records
    }

    #[tokio::test]
    async fn test_listings_are_newest_first() {
        let f = fixture();
        seed(&f).await;

        let titles = |records: Vec<ResourceRecord>| -> Vec<String> {
            records.into_iter().map(|r| r.title).collect()
        };
        assert_eq!(
            titles(f.service.list_by_branch("CSE").await.unwrap()),
            vec!["OS Paper", "DBMS Notes"]
        );
        assert_eq!(
            titles(f.service.list_by_category("CSE", "Notes").await.unwrap()),
            vec!["DBMS Notes"]
        );
        assert_eq!(
            titles(f.service.list_interview_prep().await.unwrap()),
            vec!["Aptitude"]
        );
        assert_eq!(f.service.list_recent(Some(2)).await.unwrap().len(), 2);
        assert_eq!(f.service.list_recent(None).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_search_applies_filters_after_match() {
        let f = fixture();
        seed(&f).await;

        let hits = f
            .service
            .search("notes", &ResourceFilters::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let filtered = f
            .service
            .search(
                "s",
                &ResourceFilters {
                    branch: Some("ECE".to_string()),
                    category: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Signals");
    }

    #[tokio::test]
    async fn test_stats_count_every_branch_tag() {
        let f = fixture();
        seed(&f).await;

        let stats = f.service.stats().await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_branch["CSE"], 2);
        assert_eq!(stats.by_branch["IT"], 1);
        assert_eq!(stats.by_category["Notes"], 2);
        assert_eq!(stats.recent_uploads.len(), 4);
        assert_eq!(stats.recent_uploads[0].title, "Aptitude");
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_object() {
        let f = fixture();
        let records = seed(&f).await;
        let target = &records[0];

        let outcome = f.service.delete_resource(&admin(), target.id).await.unwrap();
        assert!(outcome.object_deleted);
        assert!(!f.storage.contains("resources/CSE/Notes/1_DBMS Notes.pdf"));
        assert!(matches!(
            f.service.get(target.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_object_already_gone() {
        let f = fixture();
        let records = seed(&f).await;
        f.storage.remove("resources/ECE/Notes/1_Signals.pdf");

        let outcome = f
            .service
            .delete_resource(&admin(), records[1].id)
            .await
            .unwrap();
        assert!(!outcome.object_deleted);
        assert_eq!(f.repository.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_survives_storage_failure() {
        let f = fixture();
        let records = seed(&f).await;
        f.storage.fail_deletes(true);

        let outcome = f
            .service
            .delete_resource(&admin(), records[2].id)
            .await
            .unwrap();
        assert!(!outcome.object_deleted);
        assert!(f.service.get(records[2].id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let f = fixture();
        let records = seed(&f).await;

        let err = f
            .service
            .delete_resource(&Identity::new("uid-2", "student@example.com"), records[0].id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(f.repository.len(), 4);
    }

    #[tokio::test]
    async fn test_delete_missing_record_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .delete_resource(&admin(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
