//! Vesper Core Library
//!
//! Domain models, error types, configuration and the pure domain logic (playback state
//! machine, prayer relevance scoring) shared by the database, service and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod playback;
pub mod relevance;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
