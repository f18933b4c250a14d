//! # dukaan-db: Storage Layer for Dukaan POS
//!
//! SQLite storage for the POS: one independent store per business mode plus
//! the master store holding the active-mode flag.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler (dukaan-server)                                       │
//! │       │  registry.store().await  (read guard, held per request)     │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                    dukaan-db (THIS CRATE)                     │  │
//! │  │                                                               │  │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌───────────────────────┐  │  │
//! │  │  │ModeRegistry│  │    Store     │  │      Migrations       │  │  │
//! │  │  │(registry)  │─►│  (pool.rs)   │  │ migrations/sqlite/    │  │  │
//! │  │  │ master.db  │  │ repositories │  │ 001_initial_schema    │  │  │
//! │  │  │ mode swap  │  │ write lock   │  │ 002_retail_catalog    │  │  │
//! │  │  └────────────┘  └──────┬───────┘  │ 003_bill_snapshot     │  │  │
//! │  │                         │          └───────────────────────┘  │  │
//! │  └─────────────────────────┼─────────────────────────────────────┘  │
//! │                            ▼                                        │
//! │        data/restaurant.db      data/grocery.db                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`pool`] - store open/close, pool configuration
//! - [`master`] - the always-on master store (mode flag)
//! - [`registry`] - active-mode registry and fenced store swapping
//! - [`migrations`] - embedded versioned migrations
//! - [`repository`] - items, billing, orders, configs, users, audit, reports
//! - `seed` - demo catalog for fresh stores
//! - [`error`] - storage error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod master;
pub mod migrations;
pub mod pool;
pub mod registry;
pub mod repository;
mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use master::MasterStore;
pub use pool::{Store, StoreConfig};
pub use registry::{ModeRegistry, StoreGuard};

// Repository re-exports for convenience
pub use repository::billing::{BillFilter, BillingService};
pub use repository::config::ConfigRepository;
pub use repository::history::{HistoryRepository, LoginHistoryFilter, StockHistoryFilter};
pub use repository::item::{ItemRepository, NewItem, UpdateItem};
pub use repository::order::OrderRepository;
pub use repository::reports::ReportsRepository;
pub use repository::user::UserRepository;
