//! Configuration error types

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid value for environment variable
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// Invalid URL format
    #[error("invalid URL format for {0}: {1}")]
    InvalidUrl(String, String),

    /// A secret is too weak for the current environment
    #[error("{name} must be at least {min_len} characters in production (got {actual})")]
    WeakSecret {
        name: &'static str,
        min_len: usize,
        actual: usize,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
