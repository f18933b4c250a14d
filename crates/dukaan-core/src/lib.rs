//! # dukaan-core: Pure Business Logic for Dukaan POS
//!
//! This crate contains all business logic as pure functions and types with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Dukaan POS Architecture                        │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                 POS Front End (out of tree)                   │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │ HTTP/JSON                         │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │                 dukaan-server (axum routes)                   │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │               ★ dukaan-core (THIS CRATE) ★                    │ │
//! │  │                                                               │ │
//! │  │   ┌──────────┐ ┌──────────┐ ┌────────────┐ ┌──────────────┐  │ │
//! │  │   │  types   │ │  money   │ │ validation │ │   license    │  │ │
//! │  │   │ Item     │ │  Money   │ │   rules    │ │   claims     │  │ │
//! │  │   │ Bill     │ │ TaxRate  │ │   checks   │ │   gating     │  │ │
//! │  │   └──────────┘ └──────────┘ └────────────┘ └──────────────┘  │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │                   dukaan-db (SQLite stores)                   │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Golden Rule
//! No database queries, no network, no file system, no async. Everything
//! here is testable with plain `#[test]`.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod license;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use license::{LicenseClaims, LicenseInfo, LicenseStatus};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// Prevents runaway carts and keeps a single sale transaction bounded.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single item in a cart line.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Default number of dine-in tables for a fresh restaurant store.
pub const DEFAULT_TOTAL_TABLES: i64 = 10;
