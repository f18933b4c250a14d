//! # Store Pool Management
//!
//! Connection pool creation and configuration for one business-mode store.
//!
//! ## Two Universes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  data/                                                              │
//! │  ├── master.db      ← mode flag only (see master.rs)                │
//! │  ├── restaurant.db  ← Store::open_mode(dir, Mode::Restaurant)       │
//! │  └── grocery.db     ← Store::open_mode(dir, Mode::Grocery)          │
//! │                                                                     │
//! │  Exactly one of restaurant.db / grocery.db is ACTIVE at a time;     │
//! │  the mode registry owns the swap. The stores never share rows.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) is enabled so readers don't block the
//! single writer and vice versa. The sale transaction additionally holds a
//! process-level write lock (see `repository::billing`), so two sales can
//! never interleave their read-validate-write sequence.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info};

use dukaan_core::Mode;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::billing::BillingService;
use crate::repository::config::ConfigRepository;
use crate::repository::history::HistoryRepository;
use crate::repository::item::ItemRepository;
use crate::repository::order::OrderRepository;
use crate::repository::reports::ReportsRepository;
use crate::repository::user::UserRepository;
use crate::seed;

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite store file.
    pub store_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a local POS counter)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    pub min_connections: u32,

    /// Connection acquire timeout.
    pub connect_timeout: Duration,

    /// How long a writer waits on a locked database before giving up.
    pub busy_timeout: Duration,

    /// Whether to run migrations on open.
    pub run_migrations: bool,
}

impl StoreConfig {
    /// Creates a new configuration with the given store path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            store_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Creates an in-memory store configuration (for testing).
    ///
    /// In-memory SQLite lives and dies with its single connection, so the
    /// pool is pinned to one connection.
    pub fn in_memory() -> Self {
        StoreConfig {
            store_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Handle to one business-mode store, providing repository access.
///
/// Cloning is cheap (the pool is internally reference-counted); all clones
/// share the same write lock, so the single-writer discipline of the billing
/// transaction holds across clones.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    /// Serializes the read-validate-write sequence of a sale per store.
    write_lock: Arc<Mutex<()>>,
}

impl Store {
    /// Opens (or creates) a store at the configured path.
    ///
    /// ## What This Does
    /// 1. Creates the store file if it doesn't exist
    /// 2. Configures SQLite: WAL mode, NORMAL synchronous, foreign keys,
    ///    busy timeout
    /// 3. Creates the connection pool
    /// 4. Applies pending versioned migrations (if enabled)
    pub async fn open(config: StoreConfig) -> DbResult<Self> {
        info!(path = %config.store_path.display(), "Opening store");

        let connect_url = format!("sqlite://{}?mode=rwc", config.store_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Store pool created");

        let store = Store {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        };

        if config.run_migrations {
            migrations::run_migrations(store.pool()).await?;
        }

        Ok(store)
    }

    /// Opens the store for `mode` under `data_dir`, creating schema, default
    /// singleton rows, default users, and the demo catalog if the store is
    /// fresh.
    ///
    /// This is the entry point the mode registry uses on every switch.
    pub async fn open_mode(data_dir: &Path, mode: Mode) -> DbResult<Self> {
        let store = Store::open(StoreConfig::new(data_dir.join(mode.store_file()))).await?;

        store.configs().ensure_defaults(mode).await?;
        store.users().ensure_defaults().await?;
        seed::seed_if_empty(&store, mode).await?;

        info!(%mode, "Store ready");
        Ok(store)
    }

    /// Returns a reference to the connection pool.
    ///
    /// For advanced queries not covered by repositories. Prefer repository
    /// methods when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the item repository.
    pub fn items(&self) -> ItemRepository {
        ItemRepository::new(self.pool.clone())
    }

    /// Returns the billing transaction service.
    pub fn billing(&self) -> BillingService {
        BillingService::new(self.pool.clone(), self.write_lock.clone())
    }

    /// Returns the active-order (dine-in table) repository.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Returns the configuration-singleton repository.
    pub fn configs(&self) -> ConfigRepository {
        ConfigRepository::new(self.pool.clone())
    }

    /// Returns the user repository.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Returns the audit-history repository.
    pub fn history(&self) -> HistoryRepository {
        HistoryRepository::new(self.pool.clone())
    }

    /// Returns the reports/dashboard repository.
    pub fn reports(&self) -> ReportsRepository {
        ReportsRepository::new(self.pool.clone())
    }

    /// Closes the connection pool.
    ///
    /// Called by the mode registry after a swap, once no request still holds
    /// this store.
    pub async fn close(&self) {
        info!("Closing store pool");
        self.pool.close().await;
    }

    /// Checks if the store is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        assert!(store.health_check().await);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        // Opening already ran them once; a second run must be a no-op.
        migrations::run_migrations(store.pool()).await.unwrap();
        assert!(store.health_check().await);
    }

    #[tokio::test]
    async fn test_open_mode_seeds_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_mode(dir.path(), Mode::Restaurant).await.unwrap();

        let items = store.items().count().await.unwrap();
        assert!(items >= 100, "expected demo catalog, got {items} items");

        // Singletons exist.
        let invoice = store.configs().invoice().await.unwrap();
        assert_eq!(invoice.heading, "BILLING POS");

        // Re-opening must not duplicate the catalog.
        let again = Store::open_mode(dir.path(), Mode::Restaurant).await.unwrap();
        assert_eq!(again.items().count().await.unwrap(), items);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = StoreConfig::new("/tmp/test.db").max_connections(10);
        assert_eq!(config.max_connections, 10);
    }
}
