//! Error handling for the edge API
//!
//! Every failure during dispatch is converted into a JSON response; nothing
//! is allowed to escape a handler. Server-side failures carry the raw error
//! message in the body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Error code for client-side handling
    pub code: &'static str,
}

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    /// Shared upload secret missing or wrong
    #[error("unauthorized: invalid upload secret")]
    Unauthorized,

    /// Requested resource not found
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Method not supported for the matched path
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Invalid request body format
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Object key could not be decoded
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// Relational store query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Object store operation failed
    #[error("object storage error: {0}")]
    ObjectStore(#[from] StorageError),

    /// No object store is bound to this deployment
    #[error("object storage not configured")]
    StorageNotConfigured,

    /// Internal server error (catch-all for unexpected errors)
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidBody(_) | Self::InvalidKey(_) => StatusCode::BAD_REQUEST,
            Self::Database(_)
            | Self::ObjectStore(_)
            | Self::StorageNotConfigured
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::InvalidKey(_) => "INVALID_KEY",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ObjectStore(_) => "STORAGE_ERROR",
            Self::StorageNotConfigured => "STORAGE_NOT_CONFIGURED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// Log the error with appropriate severity based on status code
    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Authorization error"
            );
        } else {
            tracing::debug!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Client error"
            );
        }
    }

    /// Build the response body without consuming the error
    pub fn body(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), Json(self.body())).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidBody(err.to_string())
    }
}
