use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// How a signed URL is meant to be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccessPurpose {
    /// Rendered inline by the browser.
    View,
    /// Saved to disk.
    Download,
}

impl AccessPurpose {
    /// Response content-disposition requested at signing time.
    pub fn content_disposition(&self) -> Option<&'static str> {
        match self {
            AccessPurpose::View => None,
            AccessPurpose::Download => Some("attachment"),
        }
    }
}

impl fmt::Display for AccessPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPurpose::View => write!(f, "view"),
            AccessPurpose::Download => write!(f, "download"),
        }
    }
}

/// A time-limited URL granting read access to one object. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignedAccessUrl {
    pub url: String,
    /// The stored key the URL points at, after variant resolution.
    pub key: String,
    pub purpose: AccessPurpose,
    pub expires_at: DateTime<Utc>,
}

/// Which textual form of a key an object is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingVariant {
    Decoded,
    UrlEncoded,
    PlusEncoded,
}

impl EncodingVariant {
    /// Probe order used when resolving a key.
    pub const PROBE_ORDER: [EncodingVariant; 3] = [
        EncodingVariant::Decoded,
        EncodingVariant::UrlEncoded,
        EncodingVariant::PlusEncoded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingVariant::Decoded => "decoded",
            EncodingVariant::UrlEncoded => "url-encoded",
            EncodingVariant::PlusEncoded => "plus-encoded",
        }
    }
}

/// Object metadata returned by a head lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ObjectMetadata {
    pub size: Option<i64>,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// Diagnostic report on where (and whether) a referenced object is stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileStatus {
    pub exists: bool,
    /// Stored key when found, otherwise the extracted key.
    pub key: String,
    /// `None` when no variant exists.
    pub key_type: Option<EncodingVariant>,
    pub original_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_requests_attachment() {
        assert_eq!(AccessPurpose::View.content_disposition(), None);
        assert_eq!(
            AccessPurpose::Download.content_disposition(),
            Some("attachment")
        );
    }

    #[test]
    fn test_variant_serialization() {
        let json = serde_json::to_string(&EncodingVariant::UrlEncoded).unwrap();
        assert_eq!(json, "\"url-encoded\"");
        assert_eq!(EncodingVariant::PlusEncoded.as_str(), "plus-encoded");
    }

    #[test]
    fn test_purpose_deserializes_lowercase() {
        let purpose: AccessPurpose = serde_json::from_str("\"download\"").unwrap();
        assert_eq!(purpose, AccessPurpose::Download);
    }
}
