//! Token expiry oracle.
//!
//! Decides whether an access token needs refreshing by decoding its embedded
//! `exp` claim. Pure functions, no I/O. Every decode failure is answered
//! with "expired" so a token we cannot read is refreshed rather than sent.

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use serde::Deserialize;

/// Safety margin before the actual expiry, in seconds.
///
/// A token within this window of expiring is treated as expired so it does
/// not lapse while the request is in transit.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Claims subset read from the access token.
#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    /// Expiration time (seconds since epoch).
    exp: Option<i64>,
}

/// Extract the `exp` claim from a JWT-shaped token.
///
/// Returns `None` when the token has no claims segment, the segment is not
/// valid base64url, or the claims are not valid JSON carrying an `exp`.
pub fn token_expires_at(token: &str) -> Option<i64> {
    let claims_segment = token.split('.').nth(1)?;
    let decoded = BASE64_URL_SAFE_NO_PAD.decode(claims_segment).ok()?;
    let claims: ExpiryClaims = serde_json::from_slice(&decoded).ok()?;
    claims.exp
}

/// Check whether a token is expired or about to expire.
///
/// Returns `true` when the `exp` claim is missing, unparsable, or within
/// [`EXPIRY_MARGIN_SECS`] of the current time.
pub fn is_token_expired(token: &str) -> bool {
    match token_expires_at(token) {
        Some(expires_at) => {
            let now = chrono::Utc::now().timestamp();
            expires_at < now + EXPIRY_MARGIN_SECS
        }
        None => true,
    }
}
