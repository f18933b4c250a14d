//! # API Error Type
//!
//! Unified error type for HTTP handlers: a machine-readable code plus a
//! human-readable message, serialized as JSON with a matching status code.
//!
//! Storage failures are surfaced as a generic message; the detail goes to
//! the logs, never to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use dukaan_core::CoreError;
use dukaan_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// { "code": "INSUFFICIENT_STOCK", "message": "Out of stock: Masala Chai ..." }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Cart references an unknown or inactive item (400)
    ItemNotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Requested more than the available stock (400)
    InsufficientStock,

    /// Bad credentials (401)
    InvalidCredentials,

    /// Role check failed (403)
    Unauthorized,

    /// License problem (400)
    LicenseError,

    /// Storage failure (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ItemNotFound
            | ErrorCode::ValidationError
            | ErrorCode::InsufficientStock
            | ErrorCode::LicenseError => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized => StatusCode::FORBIDDEN,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a bad-credentials error.
    pub fn invalid_credentials() -> Self {
        ApiError::new(ErrorCode::InvalidCredentials, "Invalid login")
    }

    /// Creates a license error.
    pub fn license(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::LicenseError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts business errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ItemNotFound(_) => ErrorCode::ItemNotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::Unauthorized { .. }
            | CoreError::SelfDemotion
            | CoreError::SelfDeletion
            | CoreError::LastSuperAdmin
            | CoreError::ModeNotLicensed { .. } => ErrorCode::Unauthorized,
            CoreError::InvalidMode(_) | CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => ApiError::from(core),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::Duplicate { field, value } => {
                ApiError::validation(format!("{field} '{value}' already exists"))
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!(error = %e, "Store connection failed");
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!(error = %e, "Migration failed");
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!(error = %e, "Query failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!(error = %e, "Internal storage error");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
