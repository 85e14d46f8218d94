use std::path::Path;

use crate::constants::{ALLOWED_UPLOAD_CONTENT_TYPES, ALLOWED_UPLOAD_EXTENSIONS};

/// Validation errors for uploaded study resources
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Upload validator
///
/// Checks the file itself (size, extension, content type) and the metadata
/// fields every resource must carry.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(
        max_file_size: usize,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    /// Validator with the stock extension and content-type lists.
    pub fn with_max_size(max_file_size: usize) -> Self {
        Self::new(
            max_file_size,
            ALLOWED_UPLOAD_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ALLOWED_UPLOAD_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate file extension
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = file_extension(filename)?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type.to_lowercase();

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate that the content type agrees with the file extension
    pub fn validate_extension_content_type_match(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<(), ValidationError> {
        let extension = file_extension(filename)?;
        let normalized_content_type = content_type.to_lowercase();

        let expected_content_types: &[&str] = match extension.as_str() {
            "jpg" | "jpeg" => &["image/jpeg", "image/jpg"],
            "png" => &["image/png"],
            "pdf" => &["application/pdf"],
            "ppt" => &["application/vnd.ms-powerpoint"],
            "pptx" => &["application/vnd.openxmlformats-officedocument.presentationml.presentation"],
            _ => {
                tracing::debug!(
                    extension = %extension,
                    content_type = %content_type,
                    "Unknown extension, skipping content type cross-validation"
                );
                return Ok(());
            }
        };

        if !expected_content_types
            .iter()
            .any(|ct| *ct == normalized_content_type)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: format!(
                    "{} (does not match extension '{}'. Expected one of: {})",
                    content_type,
                    extension,
                    expected_content_types.join(", ")
                ),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate the metadata fields of an upload form
    pub fn validate_fields(
        &self,
        title: &str,
        branches: &[String],
        category: &str,
    ) -> Result<(), ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if branches.iter().all(|b| b.trim().is_empty()) {
            return Err(ValidationError::MissingField("branch"));
        }
        if category.trim().is_empty() {
            return Err(ValidationError::MissingField("category"));
        }
        Ok(())
    }

    /// Validate all aspects of a file
    ///
    /// A file name without an extension is judged by its content type alone.
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<(), ValidationError> {
        self.validate_file_size(file_size)?;
        self.validate_content_type(content_type)?;
        if Path::new(filename).extension().is_some() {
            self.validate_extension(filename)?;
            self.validate_extension_content_type_match(filename, content_type)?;
        }
        Ok(())
    }
}

fn file_extension(filename: &str) -> Result<String, ValidationError> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))
}
