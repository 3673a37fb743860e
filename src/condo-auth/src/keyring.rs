//! Keyring-based credential storage.
//!
//! Stores the token pair in the system keyring:
//! - Windows: Credential Manager
//! - macOS: Keychain
//! - Linux: Secret Service (gnome-keyring, kwallet)
//!
//! Exactly two entries are kept, keyed `access_token` and `refresh_token`
//! under a single service name. No metadata is stored alongside them.

use anyhow::{Context, Result};

use crate::store::TokenStore;
use crate::types::TokenPair;

/// Service name for keyring storage.
pub const KEYRING_SERVICE: &str = "condo-client";

/// Keyring keys for the two stored values.
const KEYRING_KEY_ACCESS: &str = "access_token";
const KEYRING_KEY_REFRESH: &str = "refresh_token";

fn get_keyring_entry(service: &str, account: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(service, account).context("Failed to access keyring")
}

/// Token store backed by the platform keyring.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    /// Create a store using the default service name.
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    /// Create a store under a custom service name.
    ///
    /// Lets tests use a throwaway service so they never touch real
    /// credentials.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn load(&self, key: &str) -> Option<String> {
        let entry = match get_keyring_entry(&self.service, key) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(key, error = %e, "Keyring unavailable, treating token as absent");
                return None;
            }
        };

        match entry.get_password() {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                tracing::debug!(key, error = %e, "Keyring read failed, treating token as absent");
                None
            }
        }
    }

    fn save(&self, key: &str, value: &str) {
        let result = get_keyring_entry(&self.service, key)
            .and_then(|entry| entry.set_password(value).context("Failed to set password"));
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "Failed to save token to keyring");
        }
    }

    fn delete(&self, key: &str) {
        if let Ok(entry) = get_keyring_entry(&self.service, key) {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => {
                    tracing::debug!(key, error = %e, "Failed to delete token (may not exist)");
                }
            }
        }
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn access_token(&self) -> Option<String> {
        self.load(KEYRING_KEY_ACCESS)
    }

    fn refresh_token(&self) -> Option<String> {
        self.load(KEYRING_KEY_REFRESH)
    }

    fn set_tokens(&self, pair: &TokenPair) {
        // Both writes are attempted; a failed access-token write must not
        // prevent the refresh-token write.
        self.save(KEYRING_KEY_ACCESS, pair.access_token());
        self.save(KEYRING_KEY_REFRESH, pair.refresh_token());
    }

    fn clear_tokens(&self) {
        self.delete(KEYRING_KEY_ACCESS);
        self.delete(KEYRING_KEY_REFRESH);
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    // These talk to the real system keyring, so they are ignored by default
    // and serialized when run explicitly (cargo test -- --ignored).

    #[test]
    #[serial]
    #[ignore = "requires a system keyring"]
    fn test_round_trip_and_clear() {
        let store = KeyringTokenStore::with_service("condo-client-test");
        store.clear_tokens();

        store.set_tokens(&TokenPair::new("access-1", "refresh-1"));
        assert_eq!(store.access_token().as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));

        store.clear_tokens();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    #[serial]
    #[ignore = "requires a system keyring"]
    fn test_clear_when_empty_does_not_error() {
        let store = KeyringTokenStore::with_service("condo-client-test");
        store.clear_tokens();
        store.clear_tokens();
    }
}
