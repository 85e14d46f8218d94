use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::format::format_file_size;

/// Metadata persisted alongside an uploaded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResourceRecord {
    pub id: Uuid,
    pub title: String,
    /// One or more branch tags (`CSE`, `ECE`, `Interview-Prep`, ...).
    pub branches: Vec<String>,
    pub category: String,
    pub subject: Option<String>,
    pub credit_name: Option<String>,
    /// Storage reference of the object (full URL, `s3://` locator or bare key).
    pub file_url: String,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by: String,
    pub uploader_email: String,
    pub download_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ResourceRecord {
    /// Case-insensitive match on title, subject or credit name.
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&term)
            || self
                .subject
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&term))
            || self
                .credit_name
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&term))
    }

    pub fn has_branch(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b == branch)
    }

    pub fn matches_filters(&self, filters: &ResourceFilters) -> bool {
        filters.branch.as_deref().map_or(true, |b| self.has_branch(b))
            && filters
                .category
                .as_deref()
                .map_or(true, |c| self.category == c)
    }
}

/// Fields written when an upload completes. Id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub title: String,
    pub branches: Vec<String>,
    pub category: String,
    pub subject: Option<String>,
    pub credit_name: Option<String>,
    pub file_url: String,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_by: String,
    pub uploader_email: String,
}

/// Optional narrowing applied to listings and search.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ResourceFilters {
    pub branch: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResourceResponse {
    pub id: Uuid,
    pub title: String,
    pub branches: Vec<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_name: Option<String>,
    pub file_url: String,
    pub file_name: String,
    pub file_size: i64,
    /// e.g. `2.5 MB`
    pub file_size_display: String,
    pub file_type: String,
    pub uploader_email: String,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ResourceRecord> for ResourceResponse {
    fn from(record: ResourceRecord) -> Self {
        ResourceResponse {
            id: record.id,
            file_size_display: format_file_size(record.file_size.max(0) as u64),
            title: record.title,
            branches: record.branches,
            category: record.category,
            subject: record.subject,
            credit_name: record.credit_name,
            file_url: record.file_url,
            file_name: record.file_name,
            file_size: record.file_size,
            file_type: record.file_type,
            uploader_email: record.uploader_email,
            download_count: record.download_count,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResourceStats {
    pub total: usize,
    pub by_branch: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub recent_uploads: Vec<ResourceResponse>,
}
