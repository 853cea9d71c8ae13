//! Error handling for the SEO proxy
//!
//! Only origin failures reach the client. Song lookup failures never do:
//! the proxy falls back to the unmodified origin response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Proxy error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

#[derive(Error, Debug)]
pub enum ProxyError {
    /// Origin could not be reached or its body could not be read
    #[error("origin unreachable: {0}")]
    Origin(#[from] reqwest::Error),

    /// Incoming request could not be translated for the origin
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Origin(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Origin(_) => "ORIGIN_UNREACHABLE",
            Self::BadRequest(_) => "BAD_REQUEST",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Proxy error");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "Rejected request");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;
