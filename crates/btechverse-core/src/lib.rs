//! BTechVerse Core Library
//!
//! Domain models, error taxonomy, configuration and upload validation shared by
//! every BTechVerse crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, ResourceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AccessPurpose, Identity, NewResource, ResourceFilters, ResourceRecord, ResourceStats,
    SignedAccessUrl,
};
pub use validation::{UploadValidator, ValidationError};
