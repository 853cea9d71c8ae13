//! Edge API location as seen by clients and the SEO proxy

use crate::{get_env_or_default, get_optional_env, ConfigError, ConfigResult};

const DEFAULT_EDGE_API_URL: &str = "http://localhost:8787";

/// Header carrying the shared upload secret on mutating calls
pub const UPLOAD_SECRET_HEADER: &str = "X-Custom-Auth-Key";

/// Edge API client configuration
#[derive(Clone)]
pub struct EdgeConfig {
    /// Base URL of the edge API (no trailing slash required)
    pub api_url: String,

    /// Shared upload secret, only needed for mutating calls
    pub upload_secret: Option<String>,
}

impl std::fmt::Debug for EdgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeConfig")
            .field("api_url", &self.api_url)
            .field(
                "upload_secret",
                &self.upload_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl EdgeConfig {
    /// Load from `EDGE_API_URL` and `UPLOAD_SECRET`
    pub fn from_env() -> ConfigResult<Self> {
        let api_url = get_env_or_default("EDGE_API_URL", DEFAULT_EDGE_API_URL);
        Self::validate_url(&api_url)?;

        Ok(Self {
            api_url,
            upload_secret: get_optional_env("UPLOAD_SECRET"),
        })
    }

    /// Create a configuration with a custom URL (useful for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            api_url: url.into(),
            upload_secret: None,
        }
    }

    /// Attach the shared upload secret
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.upload_secret = Some(secret.into());
        self
    }

    /// Get the full URL for an edge API path
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn validate_url(url: &str) -> ConfigResult<()> {
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidUrl(
                "EDGE_API_URL".to_string(),
                url.to_string(),
            ))
        }
    }
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self::with_url(DEFAULT_EDGE_API_URL)
    }
}
