use async_trait::async_trait;
use btechverse_core::models::{NewResource, ResourceFilters, ResourceRecord};
use btechverse_core::AppError;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

const RESOURCE_COLUMNS: &str = "id, title, branches, category, subject, credit_name, file_url, \
     file_name, file_size, file_type, uploaded_by, uploader_email, download_count, is_active, \
     created_at";

/// Persistence for resource metadata records.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Insert a record; id and timestamp are assigned by the store.
    async fn create(&self, resource: NewResource) -> Result<ResourceRecord, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<ResourceRecord>, AppError>;

    /// Delete a record. Returns false when no record had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Active records, newest first.
    async fn list(
        &self,
        filters: &ResourceFilters,
        limit: Option<i64>,
    ) -> Result<Vec<ResourceRecord>, AppError>;

    /// Active records whose title, subject or credit name contains `term`
    /// (case-insensitive), newest first.
    async fn search(
        &self,
        term: &str,
        filters: &ResourceFilters,
    ) -> Result<Vec<ResourceRecord>, AppError>;
}

#[derive(Debug, FromRow)]
struct ResourceRow {
    id: Uuid,
    title: String,
    branches: Vec<String>,
    category: String,
    subject: Option<String>,
    credit_name: Option<String>,
    file_url: String,
    file_name: String,
    file_size: i64,
    file_type: String,
    uploaded_by: String,
    uploader_email: String,
    download_count: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<ResourceRow> for ResourceRecord {
    fn from(row: ResourceRow) -> Self {
        ResourceRecord {
            id: row.id,
            title: row.title,
            branches: row.branches,
            category: row.category,
            subject: row.subject,
            credit_name: row.credit_name,
            file_url: row.file_url,
            file_name: row.file_name,
            file_size: row.file_size,
            file_type: row.file_type,
            uploaded_by: row.uploaded_by,
            uploader_email: row.uploader_email,
            download_count: row.download_count,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Escape LIKE wildcards so a search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Postgres-backed resource repository
#[derive(Clone)]
pub struct PgResourceRepository {
    pool: PgPool,
}

impl PgResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    #[tracing::instrument(skip(self, resource), fields(db.table = "resources", db.operation = "insert"))]
    async fn create(&self, resource: NewResource) -> Result<ResourceRecord, AppError> {
        let row = sqlx::query_as::<Postgres, ResourceRow>(&format!(
            r#"
            INSERT INTO resources (
                title, branches, category, subject, credit_name, file_url,
                file_name, file_size, file_type, uploaded_by, uploader_email
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            RESOURCE_COLUMNS
        ))
        .bind(&resource.title)
        .bind(&resource.branches)
        .bind(&resource.category)
        .bind(&resource.subject)
        .bind(&resource.credit_name)
        .bind(&resource.file_url)
        .bind(&resource.file_name)
        .bind(resource.file_size)
        .bind(&resource.file_type)
        .bind(&resource.uploaded_by)
        .bind(&resource.uploader_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "resources", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<ResourceRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, ResourceRow>(&format!(
            "SELECT {} FROM resources WHERE id = $1",
            RESOURCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(skip(self), fields(db.table = "resources", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "resources", db.operation = "select"))]
    async fn list(
        &self,
        filters: &ResourceFilters,
        limit: Option<i64>,
    ) -> Result<Vec<ResourceRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, ResourceRow>(&format!(
            r#"
            SELECT {}
            FROM resources
            WHERE is_active
              AND ($1::text IS NULL OR $1 = ANY(branches))
              AND ($2::text IS NULL OR category = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
            RESOURCE_COLUMNS
        ))
        .bind(&filters.branch)
        .bind(&filters.category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "resources", db.operation = "select"))]
    async fn search(
        &self,
        term: &str,
        filters: &ResourceFilters,
    ) -> Result<Vec<ResourceRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, ResourceRow>(&format!(
            r#"
            SELECT {}
            FROM resources
            WHERE is_active
              AND (title ILIKE $1 OR subject ILIKE $1 OR credit_name ILIKE $1)
              AND ($2::text IS NULL OR $2 = ANY(branches))
              AND ($3::text IS NULL OR category = $3)
            ORDER BY created_at DESC
            "#,
            RESOURCE_COLUMNS
        ))
        .bind(like_pattern(term.trim()))
        .bind(&filters.branch)
        .bind(&filters.category)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("dbms"), "%dbms%");
        assert_eq!(like_pattern("100%_sure"), "%100\\%\\_sure%");
    }
}
