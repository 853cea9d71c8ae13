//! Client error types

use thiserror::Error;

/// Edge API and cache errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The edge API answered with a non-success status
    #[error("edge API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The upload secret was rejected
    #[error("upload secret rejected by the edge API")]
    Unauthorized,

    /// A mutating call was attempted without an upload secret configured
    #[error("UPLOAD_SECRET is required for this operation")]
    MissingSecret,

    /// Response body was not the expected JSON
    #[error("failed to parse edge API response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Base URL could not be parsed
    #[error("invalid edge API URL: {0}")]
    InvalidUrl(String),

    /// Operation needs a signed-in user
    #[error("no authenticated session")]
    NotAuthenticated,

    /// Signed in, but the profile lacks the admin role
    #[error("admin role required")]
    Forbidden,

    /// Profile store operation failed
    #[error("profile store error: {0}")]
    Profile(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
