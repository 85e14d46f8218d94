//! BTechVerse Services Layer
//!
//! Business services on top of storage and the repositories: resource
//! upload, browsing and deletion, signed access, the student counter, the
//! chat assistant and the admin allow-list. HTTP handling stays in
//! btechverse-api.

pub mod access;
pub mod auth;
pub mod chat;
pub mod resources;
pub mod students;
pub mod upload;

pub use access::AccessService;
pub use auth::{
    AdminAllowList, AuthClient, AuthError, Credentials, IdentityProvider, SessionContext,
};
pub use chat::{ChatError, ChatService, CompletionBackend, OpenAiCompletionClient};
pub use resources::ResourceService;
pub use students::StudentService;
pub use upload::{ResourceUpload, UploadService, UploadedFile};
