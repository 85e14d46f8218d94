//! Multipart resource uploads.

use crate::auth::AuthenticatedUser;
use crate::constants::MAX_BATCH_FILES;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use btechverse_core::models::{BatchUploadResult, ResourceResponse};
use btechverse_core::AppError;
use btechverse_services::{ResourceUpload, UploadedFile};
use std::sync::Arc;

fn multipart_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, e.body_text()))
    } else {
        AppError::InvalidInput(format!("{}: {}", context, e.body_text()))
    }
}

/// Read the upload form: `title`, repeated `branch`, `category`, optional
/// `subject` and `credit_name`, and one or more `file` parts.
async fn parse_upload_form(
    mut multipart: Multipart,
) -> Result<(ResourceUpload, Vec<UploadedFile>), AppError> {
    let mut upload = ResourceUpload::default();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == "file" {
            let file_name = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error("Failed to read file data", e))?;
            files.push(UploadedFile {
                file_name,
                content_type,
                data: data.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| multipart_error(&format!("Failed to read field {}", field_name), e))?;
        match field_name.as_str() {
            "title" => upload.title = value,
            "branch" | "branches" => upload
                .branches
                .extend(value.split(',').map(|b| b.trim().to_string())),
            "category" => upload.category = value,
            "subject" => upload.subject = Some(value),
            "credit_name" | "creditName" => upload.credit_name = Some(value),
            other => tracing::debug!(field = %other, "Ignoring unknown upload field"),
        }
    }

    Ok((upload, files))
}

#[utoipa::path(
    post,
    path = "/api/resources",
    tag = "resources",
    request_body(
        content_type = "multipart/form-data",
        description = "Fields `title`, `branch` (repeatable), `category`, optional `subject` and `credit_name`, and one `file`"
    ),
    responses(
        (status = 201, description = "Resource uploaded", body = ResourceResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_resource(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ResourceResponse>), HttpAppError> {
    state.uploads.authorize(&identity)?;
    let (upload, mut files) = parse_upload_form(multipart).await?;
    if files.len() != 1 {
        return Err(AppError::InvalidInput(
            "Send exactly one field named 'file'; use /api/resources/batch for several".to_string(),
        )
        .into());
    }
    let file = files.remove(0);

    let record = state.uploads.upload(&identity, &upload, file).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[utoipa::path(
    post,
    path = "/api/resources/batch",
    tag = "resources",
    request_body(
        content_type = "multipart/form-data",
        description = "Same fields as a single upload, with up to ten `file` parts sharing the metadata"
    ),
    responses(
        (status = 200, description = "Per-file upload results", body = Vec<BatchUploadResult>),
        (status = 400, description = "No files or too many files", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn batch_upload_resources(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    multipart: Multipart,
) -> Result<Json<Vec<BatchUploadResult>>, HttpAppError> {
    state.uploads.authorize(&identity)?;
    let (upload, files) = parse_upload_form(multipart).await?;
    if files.is_empty() {
        return Err(AppError::InvalidInput("No file provided".to_string()).into());
    }
    if files.len() > MAX_BATCH_FILES {
        return Err(AppError::InvalidInput(format!(
            "At most {} files per batch",
            MAX_BATCH_FILES
        ))
        .into());
    }

    let results = state.uploads.batch_upload(&identity, &upload, files).await?;
    Ok(Json(results))
}
