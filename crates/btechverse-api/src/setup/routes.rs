//! Route configuration and setup

use crate::auth::middleware::auth_middleware;
use crate::constants::{MAX_BATCH_FILES, MULTIPART_OVERHEAD_BYTES};
use crate::handlers::{access, chat, health, resources, students, upload};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use btechverse_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let body_limit = config
        .max_upload_size_bytes()
        .saturating_mul(MAX_BATCH_FILES)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let protected = protected_routes(body_limit).layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let app = public_routes()
        .merge(protected)
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::ApiDoc::openapi()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/resources", get(resources::list_resources))
        .route("/api/resources/search", get(resources::search_resources))
        .route("/api/resources/stats", get(resources::resource_stats))
        .route("/api/resources/{id}", get(resources::get_resource))
        .route("/api/resources/{id}/view", get(access::view_resource))
        .route("/api/resources/{id}/download", get(access::download_resource))
        .route("/api/resources/{id}/status", get(access::resource_file_status))
        .route("/api/files/refresh", post(access::refresh_url))
        .route("/api/students/visit", post(students::record_visit))
        .route("/api/students/count", get(students::student_count))
        .route("/api/chat", post(chat::chat_proxy))
}

/// Routes that require a bearer token; admin checks happen in the services.
///
/// Only the multipart upload routes lift axum's default body limit, up to
/// `upload_body_limit`. Every other route keeps the default.
fn protected_routes(upload_body_limit: usize) -> Router<Arc<AppState>> {
    let uploads = Router::new()
        .route("/api/resources", post(upload::upload_resource))
        .route("/api/resources/batch", post(upload::batch_upload_resources))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_body_limit));

    Router::new()
        .route("/api/resources/{id}", delete(resources::delete_resource))
        .merge(uploads)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
