use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use btechverse_core::AppError;
use std::sync::Arc;

/// Require a valid bearer token and attach the caller's identity.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) => token.trim().to_string(),
            None => {
                return HttpAppError(AppError::Unauthorized(
                    "Invalid authorization header format".to_string(),
                ))
                .into_response();
            }
        },
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    match state.jwt.verify(&token) {
        Ok(identity) => {
            tracing::debug!(user_id = %identity.user_id, "Request authenticated");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}
