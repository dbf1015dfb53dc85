//! Server-wide error type
//!
//! Every handler returns `Result<_, AppError>`. The `IntoResponse` impl is the
//! single place where errors become HTTP responses, so no handler builds its
//! own error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::api::response::ErrorResponse;

/// Machine-readable tag attached to uniqueness violations
pub const UNIQUE_STATUS: &str = "UNIQUE";

/// Message returned for uniqueness violations
pub const DUPLICATE_MESSAGE: &str = "Found resource with same field";

/// Message returned when a value does not fit its column
pub const VALUE_TOO_LONG_MESSAGE: &str = "A field value is too long";

/// Message returned for every unclassified failure
pub const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// Result type alias for handlers
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    /// First failing field's message
    #[error("{0}")]
    Validation(String),

    /// A unique constraint was violated; holds the constraint name for logs
    #[error("{}", DUPLICATE_MESSAGE)]
    Duplicate(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// A collaborator (mail, geocoder, storage) failed
    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn upstream(message: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Upstream {
            message,
            source: source.into(),
        }
    }

    /// Not-found error for an identifier that does not resolve
    pub fn resource_not_found(raw_id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("Resource not found with id of {}", raw_id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Duplicate(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Upstream { .. } | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

/// Classify a PostgreSQL error by SQLSTATE
///
/// Returns `None` for codes that stay a 500.
fn classify_sqlstate(code: Option<&str>, constraint: Option<&str>) -> Option<AppError> {
    match code? {
        // unique_violation
        "23505" => Some(AppError::Duplicate(constraint.unwrap_or("unknown").to_string())),
        // string_data_right_truncation
        "22001" => Some(AppError::Validation(VALUE_TOO_LONG_MESSAGE.to_string())),
        // check_violation
        "23514" => Some(AppError::Validation(format!(
            "Invalid value for {}",
            constraint.unwrap_or("field")
        ))),
        _ => None,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let classified = match &err {
            sqlx::Error::RowNotFound => Some(AppError::NotFound("Resource not found".to_string())),
            sqlx::Error::Database(db_err) => {
                classify_sqlstate(db_err.code().as_deref(), db_err.constraint())
            },
            _ => None,
        };

        classified.unwrap_or(AppError::Database(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::Duplicate(ref constraint) => {
                tracing::debug!(constraint = %constraint, "Unique constraint violated");
                ErrorResponse::with_status(DUPLICATE_MESSAGE, UNIQUE_STATUS)
            },
            AppError::Upstream {
                message,
                ref source,
            } => {
                tracing::error!(error = ?source, "{}", message);
                ErrorResponse::new(message)
            },
            AppError::Database(ref e) => {
                tracing::error!(error = ?e, "Database error");
                ErrorResponse::new(SERVER_ERROR_MESSAGE)
            },
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                ErrorResponse::new(SERVER_ERROR_MESSAGE)
            },
            other => ErrorResponse::new(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Parse a path identifier, mapping a malformed value to a 404
pub fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::resource_not_found(raw))
}
