use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::resource::ResourceResponse;
use crate::format::format_count;

/// Result of deleting a resource. The record is always gone once this is
/// returned; `object_deleted` reports whether the stored file went with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteOutcome {
    pub record_id: Uuid,
    pub object_deleted: bool,
}

/// Per-file entry of a batch upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchUploadResult {
    pub file_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchUploadResult {
    pub fn succeeded(file_name: impl Into<String>, resource: ResourceResponse) -> Self {
        Self {
            file_name: file_name.into(),
            success: true,
            resource: Some(resource),
            error: None,
        }
    }

    pub fn failed(file_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            success: false,
            resource: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentCount {
    pub count: i64,
    /// Short display form, e.g. `1.2k`
    pub formatted: String,
}

impl StudentCount {
    pub fn new(count: i64) -> Self {
        Self {
            count,
            formatted: format_count(count.max(0) as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_batch_entry_omits_resource() {
        let json = serde_json::to_value(BatchUploadResult::failed("a.zip", "bad type")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "bad type");
        assert!(json.get("resource").is_none());
    }

    #[test]
    fn test_student_count_formatting() {
        assert_eq!(StudentCount::new(1_260).formatted, "1.3k");
        assert_eq!(StudentCount::new(42).formatted, "42");
    }
}
