//! # Master Store
//!
//! The always-on `master.db` holding global configuration shared across
//! business modes. Today that is a single key: `app_type`, the persisted
//! business mode. The per-mode stores never see this file.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use dukaan_core::Mode;

use crate::error::{DbError, DbResult};

/// Key under which the active business mode is persisted.
const KEY_APP_TYPE: &str = "app_type";

/// Handle to the master store.
#[derive(Debug, Clone)]
pub struct MasterStore {
    pool: SqlitePool,
}

impl MasterStore {
    /// Opens (or creates) the master store and ensures its schema.
    pub async fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening master store");

        let url = format!("sqlite://{}?mode=rwc", path.display());
        let connect_options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        sqlx::query("CREATE TABLE IF NOT EXISTS config (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
            .execute(&pool)
            .await?;

        Ok(MasterStore { pool })
    }

    /// Reads the persisted mode, seeding the default (RESTAURANT) if unset.
    pub async fn mode(&self) -> DbResult<Mode> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM config WHERE key = ?1")
                .bind(KEY_APP_TYPE)
                .fetch_optional(&self.pool)
                .await?;

        match value {
            Some(raw) => match raw.parse::<Mode>() {
                Ok(mode) => Ok(mode),
                Err(_) => {
                    // Unrecognized flag (hand-edited file?): fall back to the
                    // default and repair the row.
                    tracing::warn!(%raw, "Unrecognized persisted mode, resetting to default");
                    self.set_mode(Mode::default()).await?;
                    Ok(Mode::default())
                }
            },
            None => {
                debug!("No persisted mode, seeding default");
                self.set_mode(Mode::default()).await?;
                Ok(Mode::default())
            }
        }
    }

    /// Persists the mode flag.
    pub async fn set_mode(&self, mode: Mode) -> DbResult<()> {
        sqlx::query("INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)")
            .bind(KEY_APP_TYPE)
            .bind(mode.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Closes the pool. Only used on process shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_to_restaurant() {
        let dir = tempfile::tempdir().unwrap();
        let master = MasterStore::open(dir.path().join("master.db")).await.unwrap();
        assert_eq!(master.mode().await.unwrap(), Mode::Restaurant);
    }

    #[tokio::test]
    async fn test_set_and_reread() {
        let dir = tempfile::tempdir().unwrap();
        let master = MasterStore::open(dir.path().join("master.db")).await.unwrap();
        master.set_mode(Mode::Grocery).await.unwrap();
        assert_eq!(master.mode().await.unwrap(), Mode::Grocery);

        // Survives a reopen.
        master.close().await;
        let reopened = MasterStore::open(dir.path().join("master.db")).await.unwrap();
        assert_eq!(reopened.mode().await.unwrap(), Mode::Grocery);
    }
}
