//! Type definitions for authentication data.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// An access/refresh token pair held in memory.
///
/// Both values are protected with `SecretString` so they never appear in
/// debug output or logs. The credential store is the only long-lived owner
/// of these values; everything else borrows them transiently.
pub struct TokenPair {
    access_token: SecretString,
    refresh_token: SecretString,
}

impl TokenPair {
    /// Create a new pair from raw token strings.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
        }
    }

    /// Get the access token (exposes the secret - use sparingly).
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Get the refresh token (exposes the secret - use sparingly).
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Response body of `POST /auth/refresh`.
///
/// The backend may rotate the refresh token; when it does not, the caller
/// keeps using the previous one.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    /// The newly issued access token.
    pub access_token: String,
    /// A rotated refresh token, if the backend issued one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token type (always "Bearer").
    #[serde(default)]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}
