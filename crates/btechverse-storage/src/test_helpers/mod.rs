//! Test helpers for storage consumers
//!
//! Enabled for this crate's tests and, via the `test-helpers` feature, for
//! downstream crates that need a storage backend without S3.

mod memory_storage;

pub use memory_storage::MemoryStorage;
