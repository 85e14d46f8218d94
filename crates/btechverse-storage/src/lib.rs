//! BTechVerse Storage Library
//!
//! Object storage for uploaded study resources and the [`ResourceLocator`],
//! which turns any stored file reference into a concrete object key and a
//! short-lived access URL.
//!
//! # Storage key format
//!
//! Uploads are written under `resources/<branch>/<category>/<millis>_<title>.<ext>`.
//! Older objects may be stored under a percent-encoded or plus-encoded form of
//! the same key; the locator probes those variants in a fixed order.

pub mod factory;
pub mod keys;
pub mod locator;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{encoding_variants, extract_key, upload_key, EncodedKey, KeyError};
pub use locator::{LocatorError, ResourceLocator};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
