//! SEO proxy configuration

use anyhow::{Context, Result};
use dilshan_shared_config::{get_env_or_default, parse_env, EdgeConfig, Environment};

const DEFAULT_ORIGIN_URL: &str = "http://localhost:3000";
const DEFAULT_SITE_NAME: &str = "Dilshan Music";

/// SEO proxy configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 8788)
    pub port: u16,

    /// Static site origin every request is forwarded to
    pub origin_url: String,

    /// Site name appended to injected page titles
    pub site_name: String,

    /// Edge API used for the song lookup
    pub edge: EdgeConfig,

    pub environment: Environment,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `ORIGIN_URL` must be an absolute http(s) URL; a trailing slash is
    /// dropped.
    pub fn from_env() -> Result<Self> {
        let origin_url = get_env_or_default("ORIGIN_URL", DEFAULT_ORIGIN_URL);
        let parsed = url::Url::parse(&origin_url)
            .with_context(|| format!("Invalid ORIGIN_URL: {}", origin_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("ORIGIN_URL must use http or https, got {}", origin_url);
        }

        Ok(Self {
            port: parse_env("PORT", 8788)?,
            origin_url: origin_url.trim_end_matches('/').to_string(),
            site_name: get_env_or_default("SITE_NAME", DEFAULT_SITE_NAME),
            edge: EdgeConfig::from_env()?,
            environment: Environment::from_env(),
        })
    }

    /// Configuration pointing at explicit origin and edge URLs
    pub fn with_urls(origin_url: impl Into<String>, edge_url: impl Into<String>) -> Self {
        let origin_url: String = origin_url.into();
        Self {
            port: 0,
            origin_url: origin_url.trim_end_matches('/').to_string(),
            site_name: DEFAULT_SITE_NAME.to_string(),
            edge: EdgeConfig::with_url(edge_url),
            environment: Environment::Development,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        for var in ["PORT", "ORIGIN_URL", "SITE_NAME", "EDGE_API_URL"] {
            env::remove_var(var);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 8788);
        assert_eq!(config.origin_url, "http://localhost:3000");
        assert_eq!(config.site_name, "Dilshan Music");
        assert_eq!(config.edge.api_url, "http://localhost:8787");
    }

    #[test]
    fn test_rejects_non_http_origin() {
        let _lock = ENV_MUTEX.lock().unwrap();
        env::set_var("ORIGIN_URL", "ftp://files.example.com");

        let result = Config::from_env();
        env::remove_var("ORIGIN_URL");
        assert!(result.is_err());
    }

    #[test]
    fn test_with_urls_trims_origin() {
        let config = Config::with_urls("https://site.example.com/", "http://edge");
        assert_eq!(config.origin_url, "https://site.example.com");
    }
}
