//! BTechVerse Database Layer
//!
//! Repositories for resource metadata and the student counter. Each repository
//! is a trait with a Postgres implementation, so services can be exercised
//! against the in-memory implementations in [`test_helpers`].

pub mod counter;
pub mod resource;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use counter::{PgStudentCounterRepository, StudentCounterRepository, STUDENTS_COUNTER};
pub use resource::{PgResourceRepository, ResourceRepository};
