//! Credential storage abstraction.
//!
//! The store owns exactly two opaque string values: the access token and
//! the refresh token. Reads never fail outward - a backend error is logged
//! and treated as "absent", so a broken keyring degrades to an
//! unauthenticated session instead of a crash.

use std::sync::RwLock;

use crate::types::TokenPair;

/// Persistent storage for the token pair.
///
/// Implementations must make `clear_tokens` idempotent and must swallow
/// backend read failures (returning `None`).
pub trait TokenStore: Send + Sync {
    /// Read the stored access token, or `None` if absent or unreadable.
    fn access_token(&self) -> Option<String>;

    /// Read the stored refresh token, or `None` if absent or unreadable.
    fn refresh_token(&self) -> Option<String>;

    /// Persist both tokens. Both writes are attempted even if one fails.
    fn set_tokens(&self, pair: &TokenPair);

    /// Remove both tokens. Safe to call when nothing is stored.
    fn clear_tokens(&self);
}

/// In-memory token store.
///
/// Used by tests and for ephemeral sessions that should not outlive the
/// process. Production code uses [`crate::KeyringTokenStore`].
#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<Option<(String, String)>>,
}

impl InMemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a token pair.
    pub fn with_tokens(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            tokens: RwLock::new(Some((access.into(), refresh.into()))),
        }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|(access, _)| access.clone()))
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|(_, refresh)| refresh.clone()))
    }

    fn set_tokens(&self, pair: &TokenPair) {
        if let Ok(mut guard) = self.tokens.write() {
            *guard = Some((
                pair.access_token().to_string(),
                pair.refresh_token().to_string(),
            ));
        }
    }

    fn clear_tokens(&self) {
        if let Ok(mut guard) = self.tokens.write() {
            *guard = None;
        }
    }
}
