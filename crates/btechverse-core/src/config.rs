//! Configuration module
//!
//! Settings are read from the process environment (after loading a `.env` file
//! when present). Every value has a default except the database URL and the
//! JWT secret, which `validate` checks before the server starts.

use std::env;

use crate::constants::{
    DEFAULT_ADMIN_EMAILS, DEFAULT_CHAT_COMPLETIONS_URL, DEFAULT_MAX_UPLOAD_SIZE_MB,
    DEFAULT_S3_BUCKET, DEFAULT_S3_REGION, DEFAULT_SIGNED_URL_TTL_SECS,
};

const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Resource service configuration
#[derive(Clone, Debug)]
pub struct ResourceConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage configuration
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub signed_url_ttl_secs: u64,
    pub max_upload_size_bytes: usize,
    // Auth configuration
    pub jwt_secret: String,
    pub admin_emails: Vec<String>,
    // Chat completion proxy
    pub openai_api_key: Option<String>,
    pub chat_completions_url: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ResourceConfig>);

impl Config {
    fn inner(&self) -> &ResourceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ResourceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn s3_bucket(&self) -> &str {
        &self.inner().s3_bucket
    }

    pub fn s3_region(&self) -> &str {
        &self.inner().s3_region
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn signed_url_ttl_secs(&self) -> u64 {
        self.inner().signed_url_ttl_secs
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().jwt_secret
    }

    pub fn admin_emails(&self) -> &[String] {
        &self.inner().admin_emails
    }

    pub fn openai_api_key(&self) -> Option<&str> {
        self.inner().openai_api_key.as_deref()
    }

    pub fn chat_completions_url(&self) -> &str {
        &self.inner().chat_completions_url
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

/// Split a comma-separated variable into trimmed, non-empty entries.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ResourceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let admin_emails = match env::var("ADMIN_EMAILS") {
            Ok(raw) => parse_list(&raw),
            Err(_) => DEFAULT_ADMIN_EMAILS.iter().map(|s| s.to_string()).collect(),
        };

        let max_upload_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_MB);

        Ok(ResourceConfig {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(SERVER_PORT),
            environment,
            cors_origins: parse_list(&cors_origins_str),
            database_url: env::var("DATABASE_URL").unwrap_or_default(),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            s3_bucket: env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_S3_BUCKET.to_string()),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .unwrap_or_else(|_| DEFAULT_S3_REGION.to_string()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.trim().is_empty()),
            signed_url_ttl_secs: env::var("SIGNED_URL_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SIGNED_URL_TTL_SECS),
            max_upload_size_bytes: max_upload_mb * 1024 * 1024,
            jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),
            admin_emails,
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            chat_completions_url: env::var("CHAT_COMPLETIONS_URL")
                .unwrap_or_else(|_| DEFAULT_CHAT_COMPLETIONS_URL.to_string()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.s3_bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("S3_BUCKET must not be empty"));
        }

        if self.signed_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("SIGNED_URL_TTL_SECS must be greater than 0"));
        }

        if self.admin_emails.is_empty() {
            tracing::warn!("ADMIN_EMAILS is empty; uploads and deletions are disabled");
        }

        if self.openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; /api/chat will return an error");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResourceConfig {
        ResourceConfig {
            server_port: 3000,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            database_url: "postgresql://localhost/btechverse".to_string(),
            db_max_connections: 5,
            db_timeout_seconds: 5,
            s3_bucket: DEFAULT_S3_BUCKET.to_string(),
            s3_region: DEFAULT_S3_REGION.to_string(),
            s3_endpoint: None,
            signed_url_ttl_secs: DEFAULT_SIGNED_URL_TTL_SECS,
            max_upload_size_bytes: 50 * 1024 * 1024,
            jwt_secret: "a".repeat(32),
            admin_emails: vec!["admin@btechverse.com".to_string()],
            openai_api_key: None,
            chat_completions_url: DEFAULT_CHAT_COMPLETIONS_URL.to_string(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = sample();
        config.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_postgres_url_rejected() {
        let mut config = sample();
        config.database_url = "mysql://localhost/db".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = sample();
        config.signed_url_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_list_trims_and_skips_empty() {
        assert_eq!(
            parse_list(" a@x.com, ,B@y.com "),
            vec!["a@x.com".to_string(), "B@y.com".to_string()]
        );
    }

    #[test]
    fn test_production_detection() {
        let config = Config(Box::new(ResourceConfig {
            environment: "Prod".to_string(),
            ..sample()
        }));
        assert!(config.is_production());
        assert!(!Config(Box::new(sample())).is_production());
    }
}
