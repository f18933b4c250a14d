//! # Error Types
//!
//! Domain-specific error types for dukaan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  dukaan-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  dukaan-db errors (separate crate)                                  │
//! │  └── DbError          - Storage failures (wraps CoreError for the   │
//! │                         billing transaction)                        │
//! │                                                                     │
//! │  dukaan-server errors                                               │
//! │  └── ApiError         - What the front end sees (JSON + status)     │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Include context in messages (item name, role, mode)
//! 3. Errors are enum variants, never bare Strings

use thiserror::Error;

use crate::types::{Mode, Role};

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// These are client errors: they are surfaced verbatim to the caller and
/// never retried.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Cart references an item that does not exist or is inactive.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// A cart line requests more than the available stock.
    ///
    /// Always names the offending item so the cashier can fix the cart.
    #[error("Out of stock: {name} (available {available}, requested {requested})")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Caller's role does not permit the operation.
    #[error("Unauthorized: requires {required} role")]
    Unauthorized { required: Role },

    /// Mode string is not one of RESTAURANT / GROCERY.
    #[error("Invalid business mode: {0}")]
    InvalidMode(String),

    /// The active license does not cover the requested mode.
    #[error("Your license does not include the {mode} module")]
    ModeNotLicensed { mode: Mode },

    /// A SUPER_ADMIN tried to strip their own role.
    #[error("Cannot demote yourself from SUPER_ADMIN")]
    SelfDemotion,

    /// A user tried to delete their own account.
    #[error("Cannot delete yourself")]
    SelfDeletion,

    /// The operation would leave the store without any SUPER_ADMIN.
    #[error("Cannot remove the last SUPER_ADMIN")]
    LastSuperAdmin,

    /// Input validation failure (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage access; the request is rejected outright.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (bad date, bad product code, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. duplicate username).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Masala Chai".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Out of stock: Masala Chai (available 2, requested 3)"
        );

        let err = CoreError::Unauthorized {
            required: Role::SuperAdmin,
        };
        assert_eq!(err.to_string(), "Unauthorized: requires SUPER_ADMIN role");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "cart".to_string(),
        };
        assert_eq!(err.to_string(), "cart is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
