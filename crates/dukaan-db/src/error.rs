//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  SQLite error (sqlx::Error)                                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  DbError (this module) ← adds context and categorization            │
//! │       │     ▲                                                       │
//! │       │     └── DbError::Domain carries CoreError out of the        │
//! │       │         billing transaction (ItemNotFound, stock, roles)    │
//! │       ▼                                                             │
//! │  ApiError (server crate) ← serialized JSON + HTTP status            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use dukaan_core::CoreError;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in the active store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate username, product code).
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Store file could not be opened or the pool is gone.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A versioned migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Business rule violation surfaced from inside a storage operation.
    ///
    /// The billing transaction validates stock while holding the store's
    /// write path, so ItemNotFound / InsufficientStock originate here.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Duplicate error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound  → DbError::NotFound
/// sqlx::Error::Database     → inspect message for constraint type
/// pool closed / timed out   → DbError::ConnectionFailed
/// Other                     → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();

                // SQLite constraint messages:
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "CHECK constraint failed: <table>"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::Duplicate {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg)
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionFailed("Connection pool timed out".to_string())
            }

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
