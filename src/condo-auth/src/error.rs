//! Error types for condo-auth.

use thiserror::Error;

/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors surfaced by the token lifecycle.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend refused the refresh token (expired or revoked).
    /// Terminal: stored tokens have been cleared and logout broadcast.
    #[error("Refresh token rejected by server (HTTP {status})")]
    RefreshRejected { status: u16 },

    /// No refresh token is stored, so a refresh cannot be attempted.
    /// Terminal in the same way as a rejection.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The refresh endpoint could not be reached (no HTTP response).
    /// The stored session is left intact for a later retry.
    #[error("Refresh endpoint unreachable: {0}")]
    RefreshUnavailable(String),

    /// A concurrent refresh this caller was waiting on failed.
    #[error("Token refresh failed")]
    RefreshFailed,

    /// The refresh response body could not be parsed.
    #[error("Invalid refresh response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    /// True when the failure means the session is over (tokens purged,
    /// logout broadcast). Transport failures are not terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AuthError::RefreshRejected { .. } | AuthError::NoRefreshToken
        )
    }
}
