//! Client configuration.
//!
//! Base URL and request timeout come from the environment with sensible
//! defaults; everything is overridable programmatically for tests.

use std::time::Duration;

/// Default API base URL when `YOOKYE_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Yookye backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, including any path prefix (e.g. `/api`).
    pub api_base_url: String,
    /// Timeout applied to every individual HTTP request.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Build a config from the environment (`YOOKYE_API_URL`), falling
    /// back to defaults.
    pub fn from_env() -> Self {
        let api_base_url =
            std::env::var("YOOKYE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self {
            api_base_url,
            ..Self::default()
        }
    }

    /// Override the base URL (used by tests pointing at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }
}
