//! Application state shared by every handler.

use crate::auth::JwtService;
use btechverse_core::Config;
use btechverse_services::{
    AccessService, ChatService, ResourceService, StudentService, UploadService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub resources: ResourceService,
    pub uploads: UploadService,
    pub access: AccessService,
    pub students: StudentService,
    pub chat: ChatService,
    pub jwt: JwtService,
}
