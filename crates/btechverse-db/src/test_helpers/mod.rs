//! In-memory repositories for testing without a database

mod memory_repositories;

pub use memory_repositories::{InMemoryCounterRepository, InMemoryResourceRepository};
