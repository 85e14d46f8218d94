pub mod access;
pub mod chat;
pub mod health;
pub mod resources;
pub mod students;
pub mod upload;
