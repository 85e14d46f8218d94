//! Chat completion proxy.

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use btechverse_core::models::{ChatCompletionRequest, ChatProxyRequest};
use btechverse_services::ChatError;
use std::sync::Arc;
use validator::Validate;

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Forward a chat completion request to the configured endpoint.
///
/// Upstream error statuses and bodies are passed through unchanged; any other
/// failure is a 500 with `{"error": ...}`.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatProxyRequest,
    responses(
        (status = 200, description = "Completion response from the upstream endpoint"),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Proxy failure or missing API key")
    )
)]
pub async fn chat_proxy(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ChatProxyRequest>,
) -> Result<Response, HttpAppError> {
    request.validate()?;

    let completion = ChatCompletionRequest::from(request);
    match state.chat.proxy(&completion).await {
        Ok(body) => Ok(Json(body).into_response()),
        Err(ChatError::Upstream { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            Ok(Response::builder()
                .status(status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap_or_else(|_| error_body(status, "Upstream error")))
        }
        Err(e) => {
            tracing::error!(error = %e, "Chat proxy failed");
            Ok(error_body(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))
        }
    }
}
