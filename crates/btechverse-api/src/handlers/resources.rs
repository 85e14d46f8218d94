use crate::auth::AuthenticatedUser;
use crate::error::{query_rejection, ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use btechverse_core::models::{
    DeleteOutcome, ResourceFilters, ResourceRecord, ResourceResponse, ResourceStats,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Only resources tagged with this branch
    pub branch: Option<String>,
    /// Only resources in this category
    pub category: Option<String>,
    /// Return only the newest `n` resources
    pub recent: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive text matched against title, subject and credit name
    #[serde(default)]
    pub q: String,
    pub branch: Option<String>,
    pub category: Option<String>,
}

fn responses(records: Vec<ResourceRecord>) -> Vec<ResourceResponse> {
    records.into_iter().map(ResourceResponse::from).collect()
}

#[utoipa::path(
    get,
    path = "/api/resources",
    tag = "resources",
    params(ListQuery),
    responses(
        (status = 200, description = "Resources, newest first", body = Vec<ResourceResponse>),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<ResourceResponse>>, HttpAppError> {
    let Query(query) = query.map_err(query_rejection)?;
    let filters = ResourceFilters {
        branch: query.branch,
        category: query.category,
    };
    let records = state.resources.list(&filters, query.recent).await?;
    Ok(Json(responses(records)))
}

#[utoipa::path(
    get,
    path = "/api/resources/search",
    tag = "resources",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching resources, newest first", body = Vec<ResourceResponse>)
    )
)]
pub async fn search_resources(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<ResourceResponse>>, HttpAppError> {
    let Query(query) = query.map_err(query_rejection)?;
    let filters = ResourceFilters {
        branch: query.branch,
        category: query.category,
    };
    let records = state.resources.search(&query.q, &filters).await?;
    Ok(Json(responses(records)))
}

#[utoipa::path(
    get,
    path = "/api/resources/stats",
    tag = "resources",
    responses((status = 200, description = "Resource statistics", body = ResourceStats))
)]
pub async fn resource_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResourceStats>, HttpAppError> {
    Ok(Json(state.resources.stats().await?))
}

#[utoipa::path(
    get,
    path = "/api/resources/{id}",
    tag = "resources",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource", body = ResourceResponse),
        (status = 404, description = "Resource not found", body = ErrorResponse)
    )
)]
pub async fn get_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResourceResponse>, HttpAppError> {
    Ok(Json(state.resources.get(id).await?.into()))
}

#[utoipa::path(
    delete,
    path = "/api/resources/{id}",
    tag = "resources",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses(
        (status = 200, description = "Resource deleted", body = DeleteOutcome),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Resource not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_resource(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<DeleteOutcome>), HttpAppError> {
    let outcome = state.resources.delete_resource(&identity, id).await?;
    Ok((StatusCode::OK, Json(outcome)))
}
