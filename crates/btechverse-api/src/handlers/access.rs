//! Signed access to stored files.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use btechverse_core::models::{AccessPurpose, FileStatus, SignedAccessUrl};
use btechverse_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    /// A previously issued signed URL, a stored file URL, an `s3://` locator or a bare key
    pub url: String,
    /// Defaults to `view`
    pub purpose: Option<AccessPurpose>,
}

#[utoipa::path(
    get,
    path = "/api/resources/{id}/view",
    tag = "access",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Signed URL for inline viewing", body = SignedAccessUrl),
        (status = 400, description = "Stored reference is malformed", body = ErrorResponse),
        (status = 403, description = "Storage refused access", body = ErrorResponse),
        (status = 404, description = "Resource or file not found", body = ErrorResponse),
        (status = 502, description = "Storage unavailable", body = ErrorResponse)
    )
)]
pub async fn view_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SignedAccessUrl>, HttpAppError> {
    Ok(Json(state.access.view_url(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/resources/{id}/download",
    tag = "access",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Signed URL that downloads as an attachment", body = SignedAccessUrl),
        (status = 404, description = "Resource or file not found", body = ErrorResponse)
    )
)]
pub async fn download_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SignedAccessUrl>, HttpAppError> {
    Ok(Json(state.access.download_url(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/resources/{id}/status",
    tag = "access",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Which key variant exists in storage", body = FileStatus),
        (status = 404, description = "Resource not found", body = ErrorResponse)
    )
)]
pub async fn resource_file_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<FileStatus>, HttpAppError> {
    Ok(Json(state.access.file_status(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/files/refresh",
    tag = "access",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Freshly signed URL", body = SignedAccessUrl),
        (status = 400, description = "Malformed reference", body = ErrorResponse)
    )
)]
pub async fn refresh_url(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> Result<Json<SignedAccessUrl>, HttpAppError> {
    if request.url.trim().is_empty() {
        return Err(AppError::InvalidReference("url must not be empty".to_string()).into());
    }
    let purpose = request.purpose.unwrap_or(AccessPurpose::View);
    Ok(Json(state.access.refresh(&request.url, purpose).await?))
}
