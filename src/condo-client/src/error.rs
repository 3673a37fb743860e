//! Error types for the condo client.

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Main error type for the condo client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be authenticated and the one retry after a
    /// token refresh did not help (or the refresh itself failed).
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Transport-level failure: no HTTP response was received. Includes
    /// connection errors and the request timeout.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Server error ({status}): {message}")]
    Server {
        status: u16,
        /// Machine-readable error code from the response detail, when present
        /// (`INVALID_CREDENTIALS`, `EMAIL_EXISTS`, ...).
        code: Option<String>,
        /// Human-readable message from the response detail, or the raw body.
        message: String,
    },

    /// The backend answered 2xx but the body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    /// Client-side configuration problem (bad base URL, client build failure).
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Structured error detail the backend nests under `detail`.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Error body shape: `{"detail": {"error": CODE, "message": text}}`, with
/// `detail` sometimes a plain string for framework-generated errors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Structured { detail: ErrorDetail },
    Plain { detail: String },
}

impl ApiError {
    /// Build a `Server` error from a non-success response body.
    ///
    /// The detail is parsed when it matches the backend's error envelope;
    /// an unrecognized body is carried verbatim as the message so nothing
    /// is lost.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody::Structured { detail }) => (
                detail.error,
                detail.message.unwrap_or_else(|| body.to_string()),
            ),
            Ok(ErrorBody::Plain { detail }) => (None, detail),
            Err(_) => (None, body.to_string()),
        };
        Self::Server {
            status,
            code,
            message,
        }
    }

    /// HTTP status of a server error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable backend error code, if one was returned.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
