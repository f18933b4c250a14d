//! # dukaan-server
//!
//! HTTP API for the Dukaan POS front end.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  POS front end ──► HTTP/JSON (axum) ──► registry.store() ──► SQLite │
//! │                                              │                      │
//! │                                              └─► license manager    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod license;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::router;
pub use state::{AppState, SharedState};
