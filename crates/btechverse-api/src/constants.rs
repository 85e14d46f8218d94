/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "btechverse=debug,tower_http=debug";

/// Lifetime of tokens minted by `JwtService::issue`.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 3600;

/// Most files accepted in one batch upload.
pub const MAX_BATCH_FILES: usize = 10;

/// Room for multipart boundaries and text fields on top of file bytes.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
