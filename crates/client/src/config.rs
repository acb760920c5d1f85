//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BOOKBOND_API_BASE_URL` - API base URL (default: `http://localhost:8080/api/v1`)
//! - `BOOKBOND_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `BOOKBOND_TOKEN_FILE` - Path for the persisted session token
//!   (default: `.bookbond-token` in the current directory)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TOKEN_FILE: &str = ".bookbond-token";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// BookBond client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the BookBond API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Where the session token is persisted across runs.
    pub token_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = normalize_base_url(&get_env_or_default(
            "BOOKBOND_API_BASE_URL",
            DEFAULT_BASE_URL,
        ));

        let timeout_secs = get_env_or_default(
            "BOOKBOND_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("BOOKBOND_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let token_file =
            PathBuf::from(get_env_or_default("BOOKBOND_TOKEN_FILE", DEFAULT_TOKEN_FILE));

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            token_file,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
        }
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Strip a trailing slash so joined paths never double up.
fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.token_file, PathBuf::from(".bookbond-token"));
    }

    #[test]
    fn test_normalize_base_url_strips_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://localhost:8080/api/v1/"),
            "http://localhost:8080/api/v1"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8080/api/v1"),
            "http://localhost:8080/api/v1"
        );
    }
}
