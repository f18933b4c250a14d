//! # Application State
//!
//! One shared state for all handlers: the mode registry (owning the active
//! store) and the license manager. Handlers acquire the store per request
//! via `state.registry.store().await` and hold the guard until done; that
//! guard is what keeps a mode switch from landing mid-request.

use std::sync::Arc;

use tracing::info;

use dukaan_db::{DbResult, ModeRegistry};

use crate::config::ServerConfig;
use crate::license::LicenseManager;

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub registry: ModeRegistry,
    pub license: LicenseManager,
    pub config: ServerConfig,
}

/// Handlers receive the state as an `Arc`.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Opens the master store, the active business-mode store, and loads
    /// the license file if present.
    pub async fn init(config: ServerConfig) -> DbResult<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            dukaan_db::DbError::ConnectionFailed(format!(
                "cannot create data dir {}: {e}",
                config.data_dir.display()
            ))
        })?;

        let registry = ModeRegistry::open(config.data_dir.clone()).await?;
        let license = LicenseManager::new(config.license_path.clone());

        if license.refresh().await.is_some() {
            info!("License loaded");
        }

        Ok(AppState {
            registry,
            license,
            config,
        })
    }
}
