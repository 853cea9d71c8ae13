//! Shared-secret authorization for mutating calls
//!
//! Uploads and catalog inserts must carry the `X-Custom-Auth-Key` header with
//! the server's upload secret. Reads are public.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::middleware::RequireUploadSecret;
//!
//! async fn create_song(_auth: RequireUploadSecret, body: Bytes) -> ApiResult<Json<Created>> {
//!     // only reached with a valid secret
//! }
//! ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use dilshan_shared_config::UPLOAD_SECRET_HEADER;

use crate::error::ApiError;

/// Server-side upload secret, installed as a request extension
#[derive(Clone)]
pub struct UploadSecret(Arc<str>);

impl UploadSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::from(secret.into()))
    }

    /// Check a presented secret against this one
    pub fn matches(&self, presented: &str) -> bool {
        // Compare every byte so timing does not depend on the prefix match
        let expected = self.0.as_bytes();
        let presented = presented.as_bytes();
        if expected.len() != presented.len() {
            return false;
        }
        expected
            .iter()
            .zip(presented)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for UploadSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UploadSecret([REDACTED])")
    }
}

/// Verify the upload secret header against `expected`
///
/// A missing header, a non-UTF-8 header or a mismatch are all 401.
pub fn verify_upload_secret(headers: &HeaderMap, expected: &UploadSecret) -> Result<(), ApiError> {
    let presented = headers
        .get(UPLOAD_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    if expected.matches(presented) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// Extractor that rejects the request unless it carries the upload secret
///
/// Must come before any body extractor so an unauthorized request is
/// rejected without reading the body.
#[derive(Debug, Clone, Copy)]
pub struct RequireUploadSecret;

#[async_trait]
impl<S> FromRequestParts<S> for RequireUploadSecret
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let expected = parts
            .extensions
            .get::<UploadSecret>()
            .ok_or_else(|| ApiError::Internal("upload secret not configured".to_string()))?;

        verify_upload_secret(&parts.headers, expected)?;
        Ok(RequireUploadSecret)
    }
}
