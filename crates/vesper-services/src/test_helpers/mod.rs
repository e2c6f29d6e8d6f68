//! Test helpers for service unit tests
//!
//! In-memory store implementations and fixtures so the services can be exercised without a
//! database.

pub mod fixtures;
pub mod mock_repositories;

pub use fixtures::*;
pub use mock_repositories::*;
