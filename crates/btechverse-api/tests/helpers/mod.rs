//! Test helpers: an app wired to in-memory repositories and storage.
//!
//! Run from workspace root: `cargo test -p btechverse-api`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use btechverse_api::setup::{routes, services};
use btechverse_core::models::{ChatCompletionRequest, ResourceRecord};
use btechverse_core::{Config, Identity, ResourceConfig};
use btechverse_db::test_helpers::{InMemoryCounterRepository, InMemoryResourceRepository};
use btechverse_services::{ChatError, CompletionBackend};
use btechverse_storage::keys::object_url;
use btechverse_storage::test_helpers::MemoryStorage;
use chrono::{Duration, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_BUCKET: &str = "btechverse-test";
pub const TEST_REGION: &str = "ap-south-1";
pub const TEST_JWT_SECRET: &str = "integration-test-secret-with-32-plus-chars";
pub const ADMIN_EMAIL: &str = "admin@btechverse.test";
pub const STUDENT_EMAIL: &str = "student@btechverse.test";

/// Completion endpoint that answers from a canned result and records requests.
pub struct StubCompletions {
    reply: Mutex<Result<Value, ChatError>>,
    pub requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl StubCompletions {
    pub fn answering(body: Value) -> Self {
        Self {
            reply: Mutex::new(Ok(body)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_reply(&self, reply: Result<Value, ChatError>) {
        *self.reply.lock().unwrap() = reply;
    }
}

#[async_trait]
impl CompletionBackend for StubCompletions {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<Value, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        match &*self.reply.lock().unwrap() {
            Ok(body) => Ok(body.clone()),
            Err(ChatError::Upstream { status, body }) => Err(ChatError::Upstream {
                status: *status,
                body: body.clone(),
            }),
            Err(ChatError::NotConfigured) => Err(ChatError::NotConfigured),
            Err(other) => Err(ChatError::Transport(other.to_string())),
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub resources: Arc<InMemoryResourceRepository>,
    pub storage: Arc<MemoryStorage>,
    pub completions: Arc<StubCompletions>,
    pub admin_token: String,
    pub student_token: String,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Store an object and a matching active record; returns the record.
    /// Each seeded record is newer than the previous one.
    pub fn seed(&self, title: &str, branch: &str, category: &str, key: &str) -> ResourceRecord {
        self.storage
            .put_with_type(key, b"%PDF-1.4 test", "application/pdf");
        let record = ResourceRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            branches: vec![branch.to_string()],
            category: category.to_string(),
            subject: None,
            credit_name: None,
            file_url: object_url(TEST_BUCKET, TEST_REGION, key),
            file_name: key.rsplit('/').next().unwrap_or(key).to_string(),
            file_size: 13,
            file_type: "application/pdf".to_string(),
            uploaded_by: "admin-1".to_string(),
            uploader_email: ADMIN_EMAIL.to_string(),
            download_count: 0,
            is_active: true,
            created_at: Utc::now() + Duration::milliseconds(self.resources.len() as i64),
        };
        self.resources.insert(record.clone());
        record
    }
}

pub fn test_config() -> Config {
    Config(Box::new(ResourceConfig {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 1,
        s3_bucket: TEST_BUCKET.to_string(),
        s3_region: TEST_REGION.to_string(),
        s3_endpoint: None,
        signed_url_ttl_secs: 86_400,
        max_upload_size_bytes: 1024 * 1024,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        openai_api_key: Some("sk-test".to_string()),
        chat_completions_url: "http://localhost/v1/chat/completions".to_string(),
    }))
}

pub fn setup_test_app() -> TestApp {
    let config = test_config();
    let resources = Arc::new(InMemoryResourceRepository::new());
    let storage = Arc::new(MemoryStorage::new(TEST_BUCKET));
    let completions = Arc::new(StubCompletions::answering(serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": "Normalization removes redundancy." } }]
    })));

    let deps = services::Dependencies {
        resources: resources.clone(),
        counters: Arc::new(InMemoryCounterRepository::new()),
        storage: storage.clone(),
        completions: completions.clone(),
    };
    let state = services::build_state(&config, deps);

    let admin_token = state
        .jwt
        .issue(&Identity::new("admin-1", ADMIN_EMAIL))
        .unwrap();
    let student_token = state
        .jwt
        .issue(&Identity::new("student-1", STUDENT_EMAIL))
        .unwrap();

    let router = routes::setup_routes(&config, state).unwrap();
    let server = TestServer::new(router).unwrap();

    TestApp {
        server,
        resources,
        storage,
        completions,
        admin_token,
        student_token,
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
