//! Application setup and initialization
//!
//! All initialization logic lives here instead of main.rs so the pieces can be
//! built and inspected independently.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::Result;
use fabler_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    tracing::info!("Configuration loaded successfully");

    // Setup database
    let pool = database::setup_database(&config).await?;

    // Storage backend for generated media
    let storage = fabler_storage::create_storage(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?;

    // Repositories, generation clients, and the shared state
    let state = services::initialize_services(&config, pool, storage)?;

    // Routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
