//! Condo Auth - token lifecycle for the condo client SDK.
//!
//! Owns everything between "the user typed a password" and "a request
//! carries a valid bearer token":
//! - Secure credential storage (OS keyring, in-memory for tests)
//! - Access-token expiry checks with a safety margin
//! - Single-flight refresh coordination for concurrent callers
//! - App-wide forced sign-out when a refresh is rejected
//!
//! Security features:
//! - OS keychain integration (Windows Credential Manager, macOS Keychain,
//!   Linux Secret Service)
//! - Secure memory handling with secrecy crate

mod error;
mod expiry;
mod keyring;
mod manager;
mod store;
mod types;

pub use error::{AuthError, Result};
pub use expiry::{EXPIRY_MARGIN_SECS, is_token_expired, token_expires_at};
pub use keyring::KeyringTokenStore;
pub use manager::AuthManager;
pub use store::{InMemoryTokenStore, TokenStore};
pub use types::{RefreshResponse, TokenPair};
