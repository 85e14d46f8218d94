//! OpenAPI documentation, served at `/api/openapi.json` and browsable at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use btechverse_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BTechVerse Resource API",
        version = "0.1.0",
        description = "Study resource catalogue: upload, search, signed view/download links and a chat proxy."
    ),
    paths(
        handlers::health::health_check,
        // Resources
        handlers::resources::list_resources,
        handlers::resources::search_resources,
        handlers::resources::resource_stats,
        handlers::resources::get_resource,
        handlers::resources::delete_resource,
        handlers::upload::upload_resource,
        handlers::upload::batch_upload_resources,
        // Access
        handlers::access::view_resource,
        handlers::access::download_resource,
        handlers::access::resource_file_status,
        handlers::access::refresh_url,
        // Students
        handlers::students::record_visit,
        handlers::students::student_count,
        // Chat
        handlers::chat::chat_proxy,
    ),
    components(
        schemas(
            models::ResourceResponse,
            models::ResourceStats,
            models::DeleteOutcome,
            models::BatchUploadResult,
            models::StudentCount,
            models::SignedAccessUrl,
            models::AccessPurpose,
            models::EncodingVariant,
            models::FileStatus,
            models::ObjectMetadata,
            models::ChatMessage,
            models::ChatProxyRequest,
            handlers::access::RefreshRequest,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "resources", description = "Resource catalogue, upload and deletion"),
        (name = "access", description = "Signed view and download links"),
        (name = "students", description = "Visitor counter"),
        (name = "chat", description = "Chat completion proxy"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
