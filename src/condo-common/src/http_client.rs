//! Centralized HTTP client factory for the condo SDK.
//!
//! Provides factory functions to create HTTP clients with consistent
//! configuration:
//! - `create_default_client()` - Standard 30s timeout
//! - `create_client_with_timeout(duration)` - Custom timeout
//!
//! All clients include: User-Agent, tcp_nodelay, and proper error handling.

use reqwest::Client;
use std::time::Duration;

/// User-Agent string for all HTTP requests
pub const USER_AGENT: &str = concat!("condo-client/", env!("CARGO_PKG_VERSION"));

/// Default timeout for API requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection pool idle timeout to ensure DNS is re-resolved periodically.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Creates an HTTP client with default configuration (30s timeout).
///
/// Includes: User-Agent, tcp_nodelay, 30s timeout.
pub fn create_default_client() -> Result<Client, String> {
    create_client_with_timeout(DEFAULT_TIMEOUT)
}

/// Creates an HTTP client with a custom timeout.
///
/// All clients include:
/// - User-Agent: `condo-client/{version}`
/// - tcp_nodelay: true (for lower latency)
/// - pool_idle_timeout: 60s
/// - Specified timeout (applies to the overall request)
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client, String> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .tcp_nodelay(true)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {e}"))
}
