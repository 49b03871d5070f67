//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `NYRAA_API_BASE_URL` - Base URL of the backend REST API
//!   (e.g., `http://localhost:5000`)
//!
//! ## Optional
//! - `NYRAA_STATE_PATH` - Path of the client state file
//!   (default: `nyraa-state.json` in the current directory)
//! - `NYRAA_HTTP_TIMEOUT_SECS` - Per-request HTTP timeout (default: 10)
//! - `NYRAA_CACHE_TTL_SECS` - TTL for cached read responses (default: 60)
//!
//! Logging is configured separately via `NYRAA_LOG`/`RUST_LOG` in the
//! binaries.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default per-request HTTP timeout in seconds.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default TTL for cached read responses in seconds.
const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Default state file name when `NYRAA_STATE_PATH` is not set.
const DEFAULT_STATE_FILE: &str = "nyraa-state.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the backend REST API (no trailing slash).
    pub api_base_url: Url,
    /// Path of the persisted client state file.
    pub state_path: PathBuf,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
    /// TTL for cached read responses.
    pub cache_ttl: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(&get_required_env("NYRAA_API_BASE_URL")?)?;

        let state_path = get_optional_env("NYRAA_STATE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_FILE), PathBuf::from);

        let http_timeout = parse_secs(
            "NYRAA_HTTP_TIMEOUT_SECS",
            get_env_or_default("NYRAA_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
        )?;

        let cache_ttl = parse_secs(
            "NYRAA_CACHE_TTL_SECS",
            get_env_or_default("NYRAA_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
        )?;

        Ok(Self {
            api_base_url,
            state_path,
            http_timeout,
            cache_ttl,
        })
    }

    /// Build a configuration with explicit values (used by tests and the
    /// integration harness, which never read the process environment).
    #[must_use]
    pub fn for_endpoint(api_base_url: Url, state_path: PathBuf) -> Self {
        Self {
            api_base_url,
            state_path,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

/// Parse and normalize the API base URL.
///
/// The scheme must be http or https. The path is normalized to end with a
/// slash so endpoint paths join underneath it instead of replacing its last
/// segment.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("NYRAA_API_BASE_URL".to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            "NYRAA_API_BASE_URL".to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }

    Ok(url)
}

/// Parse a positive seconds value into a `Duration`.
fn parse_secs(key: &str, value: String) -> Result<Duration, ConfigError> {
    let secs = value
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }

    Ok(Duration::from_secs(secs))
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a numeric default.
fn get_env_or_default(key: &str, default: u64) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_normalizes_path() {
        let url = parse_base_url("http://localhost:5000").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/");

        let url = parse_base_url("https://shop.nyraa.in/backend").unwrap();
        assert_eq!(url.join("api/health").unwrap().as_str(),
            "https://shop.nyraa.in/backend/api/health");
    }

    #[test]
    fn test_parse_base_url_rejects_bad_scheme() {
        let result = parse_base_url("ftp://example.com");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_parse_secs_rejects_zero() {
        let result = parse_secs("NYRAA_HTTP_TIMEOUT_SECS", "0".to_string());
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_secs_valid() {
        let d = parse_secs("NYRAA_CACHE_TTL_SECS", "30".to_string()).unwrap();
        assert_eq!(d, Duration::from_secs(30));
    }

    #[test]
    fn test_for_endpoint_defaults() {
        let config = StorefrontConfig::for_endpoint(
            Url::parse("http://127.0.0.1:5000").unwrap(),
            PathBuf::from("/tmp/state.json"),
        );
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }
}
