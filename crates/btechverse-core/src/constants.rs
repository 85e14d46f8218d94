//! Shared constants

/// Default bucket holding every uploaded resource.
pub const DEFAULT_S3_BUCKET: &str = "btech-verse";

/// Default region of the resource bucket.
pub const DEFAULT_S3_REGION: &str = "eu-north-1";

/// Domain suffix that identifies a full storage-provider URL.
pub const STORAGE_DOMAIN_SUFFIX: &str = "amazonaws.com";

/// Host prefix of path-style regional endpoints (`s3.<region>.amazonaws.com`).
pub const REGIONAL_HOST_PREFIX: &str = "s3.";

/// Short-form locator scheme (`s3://bucket/key`).
pub const LOCATOR_SCHEME: &str = "s3://";

/// Lifetime of view and download URLs: 24 hours.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 86_400;

/// Upload size limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 50;

/// Prefix of every upload key.
pub const RESOURCE_KEY_PREFIX: &str = "resources";

/// Branch tag used for interview preparation material.
pub const INTERVIEW_PREP_BRANCH: &str = "Interview-Prep";

/// Default number of entries returned by the recent uploads listing.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Number of recent uploads included in resource stats.
pub const STATS_RECENT_LIMIT: usize = 5;

/// Time allowed for the identity provider to create an account.
pub const SIGNUP_TIMEOUT_SECS: u64 = 10;

/// Content types accepted for uploads.
pub const ALLOWED_UPLOAD_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// File extensions accepted for uploads.
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "ppt", "pptx"];

/// Admin allow-list used when `ADMIN_EMAILS` is not set.
pub const DEFAULT_ADMIN_EMAILS: &[&str] = &[
    "admin@btechverse.com",
    "admin@example.com",
    "user@test.com",
    "amanvverma109@gmail.com",
];

/// Chat completion defaults.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_CHAT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_CHAT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
