//! Error types shared by the storage engine and the HTTP layer.
//!
//! [`StoreError`] is the storage taxonomy every backend translates into before
//! returning; no `sqlx`, `serde_json` or I/O error crosses a store boundary.
//! [`AppError`] is the HTTP-facing envelope built from it.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Failure taxonomy of the short-link storage engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The short code was never issued.
    #[error("short link not found: {0}")]
    NotFound(String),

    /// The short code exists but has been soft-deleted.
    #[error("short link is gone: {0}")]
    Gone(String),

    /// The origin is already shortened for this owner.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Malformed input such as an empty batch or a malformed short code.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The backend could not be reached or did not answer in time.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend handle (or the delete queue) has been closed.
    #[error("storage is closed")]
    Closed,

    /// Serialization, random source or unexpected backend failure.
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return StoreError::AlreadyExists(db.constraint().unwrap_or("unique").to_string());
        }

        let message = e.to_string();
        match e {
            sqlx::Error::PoolClosed => StoreError::Closed,
            sqlx::Error::PoolTimedOut
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(message),
            _ => StoreError::Internal(message),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::Internal(format!("migration failed: {e}"))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Internal(format!("snapshot encoding failed: {e}"))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Internal(format!("snapshot I/O failed: {e}"))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned to HTTP clients.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Gone { message: String, details: Value },
    Conflict { message: String, details: Value },
    Unavailable { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn gone(message: impl Into<String>, details: Value) -> Self {
        Self::Gone {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Gone { .. } => StatusCode::GONE,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("validation_error", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::Gone { message, details } => ("gone", message, details),
            AppError::Conflict { message, details } => ("conflict", message, details),
            AppError::Unavailable { message, details } => ("unavailable", message, details),
            AppError::Internal { message, details } => ("internal_error", message, details),
        };

        ErrorInfo {
            code,
            message: message.clone(),
            details: details.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let info = self.to_error_info();
        write!(f, "{}: {}", info.code, info.message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(code) => {
                AppError::not_found("Short link not found", json!({ "code": code }))
            }
            StoreError::Gone(code) => {
                AppError::gone("Short link has been deleted", json!({ "code": code }))
            }
            StoreError::AlreadyExists(_) => {
                AppError::conflict("Origin is already shortened", json!({}))
            }
            StoreError::InvalidInput(reason) => {
                AppError::bad_request("Invalid input", json!({ "reason": reason }))
            }
            StoreError::Unavailable(_) | StoreError::Closed => {
                AppError::unavailable("Storage is unavailable", json!({}))
            }
            StoreError::Internal(_) => AppError::internal("Internal server error", json!({})),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let errors = e.field_errors();
        let mut fields: Vec<&str> = errors.keys().map(|k| k.as_ref()).collect();
        fields.sort_unstable();
        AppError::bad_request("Validation failed", json!({ "fields": fields }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_status_mapping() {
        let cases = [
            (StoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (StoreError::Gone("x".into()), StatusCode::GONE),
            (StoreError::AlreadyExists("x".into()), StatusCode::CONFLICT),
            (StoreError::invalid_input("x"), StatusCode::BAD_REQUEST),
            (StoreError::unavailable("x"), StatusCode::SERVICE_UNAVAILABLE),
            (StoreError::Closed, StatusCode::SERVICE_UNAVAILABLE),
            (StoreError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_error_hides_backend_detail() {
        let err = AppError::from(StoreError::internal(
            "ERROR: relation \"short_links\" does not exist",
        ));

        let info = err.to_error_info();
        assert_eq!(info.code, "internal_error");
        assert!(!info.message.contains("short_links"));
        assert_eq!(info.details, json!({}));
    }

    #[test]
    fn test_pool_closed_maps_to_closed() {
        assert_eq!(StoreError::from(sqlx::Error::PoolClosed), StoreError::Closed);
    }

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
    }
}
