//! Relational store configuration types

use crate::{get_env_or_default, parse_env, ConfigResult};

/// Default SQLite location, created on first start
const DEFAULT_DATABASE_URL: &str = "sqlite://dilshan.db?mode=rwc";

/// Catalog database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection URL (e.g., sqlite://catalog.db?mode=rwc)
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            url: get_env_or_default("DATABASE_URL", DEFAULT_DATABASE_URL),
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5)?,
            connect_timeout_secs: parse_env("DATABASE_CONNECT_TIMEOUT", 30)?,
        })
    }

    /// Create a configuration with a custom URL (useful for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Whether the URL points at a throwaway in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            connect_timeout_secs: 30,
        }
    }
}
