//! Service wiring.
//!
//! Production and tests both go through [`build_state`]; they differ only in
//! the [`Dependencies`] they pass in.

use crate::auth::JwtService;
use crate::state::AppState;
use anyhow::Result;
use btechverse_core::{Config, UploadValidator};
use btechverse_db::{
    PgResourceRepository, PgStudentCounterRepository, ResourceRepository,
    StudentCounterRepository,
};
use btechverse_services::{
    AccessService, AdminAllowList, ChatService, CompletionBackend, OpenAiCompletionClient,
    ResourceService, StudentService, UploadService,
};
use btechverse_storage::{ResourceLocator, Storage};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Backends the services run against
#[derive(Clone)]
pub struct Dependencies {
    pub resources: Arc<dyn ResourceRepository>,
    pub counters: Arc<dyn StudentCounterRepository>,
    pub storage: Arc<dyn Storage>,
    pub completions: Arc<dyn CompletionBackend>,
}

impl Dependencies {
    pub fn production(config: &Config, pool: PgPool, storage: Arc<dyn Storage>) -> Result<Self> {
        Ok(Self {
            resources: Arc::new(PgResourceRepository::new(pool.clone())),
            counters: Arc::new(PgStudentCounterRepository::new(pool)),
            storage,
            completions: Arc::new(OpenAiCompletionClient::from_config(config)?),
        })
    }
}

pub fn build_state(config: &Config, deps: Dependencies) -> Arc<AppState> {
    let admins = AdminAllowList::from_config(config);
    let locator = ResourceLocator::new(deps.storage.clone());
    let validator = UploadValidator::with_max_size(config.max_upload_size_bytes());

    tracing::info!(
        admins = admins.len(),
        bucket = %locator.bucket(),
        signed_url_ttl_secs = config.signed_url_ttl_secs(),
        "Services initialized"
    );

    Arc::new(AppState {
        config: config.clone(),
        resources: ResourceService::new(deps.resources.clone(), locator.clone(), admins.clone()),
        uploads: UploadService::new(deps.resources.clone(), deps.storage, validator, admins),
        access: AccessService::new(
            deps.resources,
            locator,
            Duration::from_secs(config.signed_url_ttl_secs()),
        ),
        students: StudentService::new(deps.counters),
        chat: ChatService::new(deps.completions),
        jwt: JwtService::new(config.jwt_secret()),
    })
}
