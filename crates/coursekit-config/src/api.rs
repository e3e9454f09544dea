//! Remote API configuration.
//!
//! # Environment Variables
//!
//! - `COURSEKIT_API_URL`: Base URL of the platform API (default: `http://localhost:3000/api`)
//! - `COURSEKIT_API_TOKEN`: Bearer token sent with every request (optional)
//! - `COURSEKIT_HTTP_TIMEOUT_SECS`: Per-request timeout in seconds (default: 15)

use std::env;
use std::time::Duration;

use validator::{Validate, ValidationErrors};

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Location and credentials of the platform API.
#[derive(Clone, Debug, PartialEq, Eq, Validate)]
pub struct ApiConfig {
    /// Base URL, without a trailing slash.
    #[validate(url(message = "COURSEKIT_API_URL must be a valid URL"))]
    pub base_url: String,

    /// Bearer token for authenticated requests.
    pub token: Option<String>,

    /// Per-request timeout in seconds.
    #[validate(range(min = 1, max = 300, message = "HTTP timeout must be 1-300 seconds"))]
    pub http_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Loads and validates the configuration from environment variables.
    ///
    /// Unparseable numbers fall back to their defaults; an invalid URL is an
    /// error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            base_url: env::var("COURSEKIT_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            token: env::var("COURSEKIT_API_TOKEN")
                .ok()
                .filter(|token| !token.is_empty()),
            http_timeout_secs: env::var("COURSEKIT_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Joins a static path onto the base URL. `path` is not escaped; request
    /// identifiers belong in their own escaped path segment.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
