//! Edge API server configuration

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use dilshan_shared_config::{
    get_optional_env, parse_env, CommonConfig, ConfigError, DatabaseConfig, Environment,
    ObjectStoreConfig,
};

/// Minimum required length for UPLOAD_SECRET in production
const MIN_UPLOAD_SECRET_LENGTH: usize = 16;

/// Secret used when none is configured outside production
const DEVELOPMENT_UPLOAD_SECRET: &str = "development-upload-secret";

/// Default request body cap: 100 MiB, enough for audio uploads
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Edge API configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// Server port (default: 8787)
    pub port: u16,

    /// Shared secret required on uploads and catalog inserts
    pub upload_secret: String,

    /// Public origin used to build object URLs; derived per request when unset
    pub public_base_url: Option<String>,

    /// Request body cap in bytes
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("common", &self.common)
            .field("port", &self.port)
            .field("upload_secret", &"[REDACTED]")
            .field("public_base_url", &self.public_base_url)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// In production mode, this function requires:
    /// - `UPLOAD_SECRET`: Must be set and at least 16 characters long
    /// - `DATABASE_URL`: Must be explicitly set
    ///
    /// In development/staging mode, sensible defaults are used for convenience.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        )
        .unwrap_or_default();
        let is_production = environment.is_production();

        let upload_secret = Self::load_upload_secret(is_production)?;

        if is_production {
            Self::validate_database_url()?;
        }

        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        Ok(Self {
            common,

            port: env::var("PORT")
                .unwrap_or_else(|_| "8787".to_string())
                .parse()
                .context("Invalid PORT value")?,

            upload_secret,

            public_base_url: get_optional_env("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),

            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    /// Configuration for in-process tests: in-memory SQLite, no object store
    pub fn for_tests(upload_secret: impl Into<String>) -> Self {
        let common = CommonConfig {
            database: DatabaseConfig::with_url("sqlite::memory:"),
            object_store: ObjectStoreConfig::default(),
            edge: Default::default(),
            environment: Environment::Development,
            log_level: "debug".to_string(),
        };

        Self {
            common,
            port: 0,
            upload_secret: upload_secret.into(),
            public_base_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Load and validate UPLOAD_SECRET
    ///
    /// In production it must be set and at least MIN_UPLOAD_SECRET_LENGTH
    /// characters. In development a fixed default is used with a warning.
    fn load_upload_secret(is_production: bool) -> Result<String> {
        match env::var("UPLOAD_SECRET") {
            Ok(secret) if !secret.is_empty() => {
                if is_production && secret.len() < MIN_UPLOAD_SECRET_LENGTH {
                    return Err(ConfigError::WeakSecret {
                        name: "UPLOAD_SECRET",
                        min_len: MIN_UPLOAD_SECRET_LENGTH,
                        actual: secret.len(),
                    }
                    .into());
                }
                Ok(secret)
            }
            _ if is_production => {
                bail!(
                    "UPLOAD_SECRET environment variable is required in production. \
                     Please set a secret of at least {} characters.",
                    MIN_UPLOAD_SECRET_LENGTH
                );
            }
            _ => {
                tracing::warn!(
                    "UPLOAD_SECRET not set, using insecure default. \
                     This is only acceptable in development mode."
                );
                Ok(DEVELOPMENT_UPLOAD_SECRET.to_string())
            }
        }
    }

    /// Validate that DATABASE_URL is explicitly set in production
    fn validate_database_url() -> Result<()> {
        match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => Ok(()),
            _ => {
                bail!(
                    "DATABASE_URL environment variable is required in production. \
                     Please set your SQLite connection string."
                );
            }
        }
    }

    /// Get database configuration
    pub fn database(&self) -> &DatabaseConfig {
        &self.common.database
    }

    /// Get environment mode
    pub fn environment(&self) -> Environment {
        self.common.environment
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }
}
