pub mod access;
pub mod chat;
pub mod identity;
pub mod outcome;
pub mod resource;

pub use access::{AccessPurpose, EncodingVariant, FileStatus, ObjectMetadata, SignedAccessUrl};
pub use chat::{ChatCompletionRequest, ChatMessage, ChatProxyRequest};
pub use identity::Identity;
pub use outcome::{BatchUploadResult, DeleteOutcome, StudentCount};
pub use resource::{
    NewResource, ResourceFilters, ResourceRecord, ResourceResponse, ResourceStats,
};
