//! Application setup and initialization
//!
//! All initialization logic extracted from main.rs: database pool and
//! migrations, storage backend, service wiring, and routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod telemetry;

use crate::services::upload::UploadService;
use crate::state::AppState;
use anyhow::Result;
use std::sync::Arc;
use tessera_core::Config;
use tessera_db::{PgImageRepository, PgUploadRepository};
use tessera_storage::LocalStorage;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let pool = database::setup_database(&config).await?;

    let storage = LocalStorage::new(
        config.storage_path(),
        config.storage_base_url().to_string(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to initialize storage: {}", e))?;

    let service = UploadService::new(
        Arc::new(PgUploadRepository::new(pool.clone())),
        Arc::new(PgImageRepository::new(pool)),
        Arc::new(storage),
    );

    let state = Arc::new(AppState {
        service,
        config: config.clone(),
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
