//! Application setup and initialization
//!
//! `main` calls [`initialize_app`]; integration tests skip telemetry and migrations and go
//! straight to [`build_app`] with a pool of their own.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use vesper_core::Config;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;
    tracing::info!(environment = %config.environment(), "Configuration loaded and validated");

    let pool = database::setup_database(&config).await?;
    build_app(config, pool).await
}

/// Services, background workers and routes on top of an existing pool.
pub async fn build_app(config: Config, pool: PgPool) -> Result<(Arc<AppState>, axum::Router)> {
    let state = services::initialize_services(&config, pool).await?;
    let router = routes::setup_routes(&config, state.clone())?;
    Ok((state, router))
}
