//! Middleware components for the edge API
//!
//! - `cors`: permissive CORS headers on every response, short-circuits
//!   preflight requests
//! - `RequireUploadSecret`: extractor gating mutating routes on the shared
//!   upload secret

pub mod auth;
pub mod cors;

pub use auth::{verify_upload_secret, RequireUploadSecret, UploadSecret};
pub use cors::cors;
