//! Client configuration.

use std::time::Duration;

/// Base URL used when none is configured (debug builds target a local
/// backend).
#[cfg(debug_assertions)]
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/v1";
/// Base URL used when none is configured.
#[cfg(not(debug_assertions))]
pub const DEFAULT_BASE_URL: &str = "https://api.condoadmin.app/v1";

/// Fixed request timeout. Applies to every request; expiring surfaces as a
/// transport error, never as a 401.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`crate::CondoClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, including the version prefix (e.g. `.../v1`).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create a configuration pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
