use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use btechverse_core::models::StudentCount;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/students/visit",
    tag = "students",
    responses((status = 200, description = "Visit counted", body = StudentCount))
)]
pub async fn record_visit(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StudentCount>, HttpAppError> {
    Ok(Json(state.students.record_student_visit().await?))
}

#[utoipa::path(
    get,
    path = "/api/students/count",
    tag = "students",
    responses((status = 200, description = "Current student count", body = StudentCount))
)]
pub async fn student_count(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StudentCount>, HttpAppError> {
    Ok(Json(state.students.student_count().await?))
}
