//! Authentication manager.
//!
//! Long-lived owner of the credential store, the single-flight refresh
//! state, and the logout callback. Constructing separate instances gives
//! tests fully isolated state; nothing here is process-global.
//!
//! Refresh concurrency contract: at most one refresh HTTP call is in
//! flight at any instant. Callers that need a token while a refresh is
//! outstanding enqueue on a FIFO waiter queue and suspend until the
//! in-flight call settles; they never issue a second refresh.

use std::sync::Arc;

use tokio::sync::{Mutex, oneshot};

use crate::error::{AuthError, Result};
use crate::expiry::is_token_expired;
use crate::store::TokenStore;
use crate::types::{RefreshResponse, TokenPair};

/// Callback invoked when a refresh irrecoverably fails.
type LogoutCallback = Box<dyn Fn() + Send + Sync>;

/// Single-flight refresh state: the in-flight flag and the waiter queue.
///
/// Owned exclusively by [`AuthManager`]; never mutated from outside it.
#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<Option<String>>>,
}

/// Authentication manager.
pub struct AuthManager {
    /// Credential store.
    store: Arc<dyn TokenStore>,
    /// HTTP client for the refresh exchange.
    http: reqwest::Client,
    /// Full URL of the refresh endpoint.
    refresh_url: String,
    /// Refresh coordination state.
    state: Mutex<RefreshState>,
    /// Registered logout callback (single slot, last writer wins).
    logout_callback: std::sync::Mutex<Option<LogoutCallback>>,
}

impl AuthManager {
    /// Create a new auth manager talking to `base_url`.
    pub fn new(store: Arc<dyn TokenStore>, base_url: &str) -> Self {
        let http = condo_common::http_client::create_default_client().unwrap_or_default();
        Self::with_http_client(store, base_url, http)
    }

    /// Create a new auth manager with a caller-provided HTTP client.
    pub fn with_http_client(
        store: Arc<dyn TokenStore>,
        base_url: &str,
        http: reqwest::Client,
    ) -> Self {
        Self {
            store,
            http,
            refresh_url: format!("{}/auth/refresh", base_url.trim_end_matches('/')),
            state: Mutex::new(RefreshState::default()),
            logout_callback: std::sync::Mutex::new(None),
        }
    }

    /// Get the credential store.
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Register the app-wide forced sign-out callback.
    ///
    /// Replaces any previously registered callback: there is a single slot,
    /// not a subscriber list.
    pub fn set_logout_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if let Ok(mut slot) = self.logout_callback.lock() {
            *slot = Some(Box::new(callback));
        }
    }

    /// Persist a new token pair (after login or registration).
    pub fn store_tokens(&self, access: &str, refresh: &str) {
        self.store.set_tokens(&TokenPair::new(access, refresh));
    }

    /// Remove the stored token pair (user-initiated logout).
    ///
    /// Does not invoke the logout callback; the caller initiated this.
    pub fn clear_session(&self) {
        self.store.clear_tokens();
    }

    /// Whether a non-expired access token is currently stored.
    pub fn is_authenticated(&self) -> bool {
        self.store
            .access_token()
            .is_some_and(|token| !is_token_expired(&token))
    }

    /// Get an access token suitable for attaching to a request.
    ///
    /// Returns the stored token when it is still valid, refreshing it first
    /// when the expiry oracle says it is stale. `Ok(None)` means no usable
    /// token exists but the session is not over - the request proceeds
    /// unauthenticated and the server will answer 401. A terminal refresh
    /// failure (session ended, logout already broadcast) is surfaced as an
    /// error so callers do not send a request that is doomed to 401 and
    /// trigger a second refresh attempt.
    pub async fn valid_access_token(&self) -> Result<Option<String>> {
        let Some(token) = self.store.access_token() else {
            return Ok(None);
        };
        if !is_token_expired(&token) {
            return Ok(Some(token));
        }

        tracing::debug!("Access token expired, refreshing before request");
        match self.refresh_access_token().await {
            Ok(fresh) => Ok(Some(fresh)),
            Err(e) if e.is_terminal() => Err(e),
            Err(e) => {
                tracing::debug!(error = %e, "Pre-request refresh failed");
                Ok(None)
            }
        }
    }

    /// Exchange the refresh token for a new access token, single-flight.
    ///
    /// The first caller while idle performs the HTTP exchange; concurrent
    /// callers enqueue and receive the same outcome in FIFO order. On a
    /// terminal failure (server rejected the refresh token, or no refresh
    /// token is stored) the token pair is cleared and the logout callback
    /// fires exactly once. A transport failure leaves the stored session
    /// intact so a later attempt can retry.
    pub async fn refresh_access_token(&self) -> Result<String> {
        let waiter = {
            let mut state = self.state.lock().await;
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.in_flight = true;
                None
            }
        };

        if let Some(rx) = waiter {
            return match rx.await {
                Ok(Some(token)) => Ok(token),
                // Sender dropped or refresh failed: the leader has already
                // handled cleanup; this caller just reports the failure.
                Ok(None) | Err(_) => Err(AuthError::RefreshFailed),
            };
        }

        let outcome = self.perform_refresh().await;

        let waiters = {
            let mut state = self.state.lock().await;
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        match outcome {
            Ok(token) => {
                for tx in waiters {
                    let _ = tx.send(Some(token.clone()));
                }
                Ok(token)
            }
            Err(e) => {
                // Every waiter settles; nobody hangs on a failed refresh.
                for tx in waiters {
                    let _ = tx.send(None);
                }
                if e.is_terminal() {
                    self.notify_logout();
                }
                Err(e)
            }
        }
    }

    /// Issue the refresh HTTP call and persist the result.
    ///
    /// Token clearing for terminal failures happens here, before any waiter
    /// is settled and before the logout callback runs.
    async fn perform_refresh(&self) -> Result<String> {
        let Some(refresh_token) = self.store.refresh_token() else {
            self.store.clear_tokens();
            return Err(AuthError::NoRefreshToken);
        };

        let response = self
            .http
            .post(&self.refresh_url)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| AuthError::RefreshUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Refresh token rejected, ending session");
            self.store.clear_tokens();
            return Err(AuthError::RefreshRejected {
                status: status.as_u16(),
            });
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        // The backend may rotate the refresh token; keep the old one when
        // it does not.
        let new_refresh = body.refresh_token.unwrap_or(refresh_token);
        self.store
            .set_tokens(&TokenPair::new(body.access_token.as_str(), new_refresh));

        tracing::info!("Successfully refreshed access token");
        Ok(body.access_token)
    }

    /// Invoke the registered logout callback, if any.
    fn notify_logout(&self) {
        tracing::info!("Session ended, broadcasting logout");
        if let Ok(slot) = self.logout_callback.lock() {
            if let Some(callback) = slot.as_ref() {
                callback();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::store::InMemoryTokenStore;

    fn manager_for(server_url: &str, store: Arc<dyn TokenStore>) -> Arc<AuthManager> {
        Arc::new(AuthManager::new(store, server_url))
    }

    async fn mount_refresh_ok(server: &MockServer, access: &str, refresh: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": access,
                "refresh_token": refresh,
                "token_type": "Bearer",
                "expires_in": 900,
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_refresh_persists_new_pair() {
        let server = MockServer::start().await;
        mount_refresh_ok(&server, "new-access", "new-refresh").await;

        let store = Arc::new(InMemoryTokenStore::with_tokens("old-access", "old-refresh"));
        let manager = manager_for(&server.uri(), store.clone());

        let token = manager.refresh_access_token().await.unwrap();
        assert_eq!(token, "new-access");
        assert_eq!(store.access_token().as_deref(), Some("new-access"));
        assert_eq!(store.refresh_token().as_deref(), Some("new-refresh"));
    }

    #[tokio::test]
    async fn test_refresh_sends_stored_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(serde_json::json!({"refresh_token": "the-refresh"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "a2",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryTokenStore::with_tokens("a1", "the-refresh"));
        let manager = manager_for(&server.uri(), store);
        manager.refresh_access_token().await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_without_rotation_keeps_old_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "a2",
            })))
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryTokenStore::with_tokens("a1", "r1"));
        let manager = manager_for(&server.uri(), store.clone());

        manager.refresh_access_token().await.unwrap();
        assert_eq!(store.access_token().as_deref(), Some("a2"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_collapse_into_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(50))
                    .set_body_json(serde_json::json!({
                        "access_token": "shared-access",
                        "refresh_token": "r2",
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryTokenStore::with_tokens("a1", "r1"));
        let manager = manager_for(&server.uri(), store);

        let (first, second, third) = tokio::join!(
            manager.refresh_access_token(),
            manager.refresh_access_token(),
            manager.refresh_access_token(),
        );

        assert_eq!(first.unwrap(), "shared-access");
        assert_eq!(second.unwrap(), "shared-access");
        assert_eq!(third.unwrap(), "shared-access");
        // expect(1) on the mock verifies the single-flight invariant on drop.
    }

    #[tokio::test]
    async fn test_waiters_drain_in_fifo_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(100))
                    .set_body_json(serde_json::json!({ "access_token": "a2" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryTokenStore::with_tokens("a1", "r1"));
        let manager = manager_for(&server.uri(), store);
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let leader = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.refresh_access_token().await })
        };

        // Let the leader take the in-flight flag before enqueuing waiters.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let mut waiters = Vec::new();
        for index in 1..=3 {
            let manager = Arc::clone(&manager);
            let order = Arc::clone(&order);
            waiters.push(tokio::spawn(async move {
                manager.refresh_access_token().await.unwrap();
                order.lock().unwrap().push(index);
            }));
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        leader.await.unwrap().unwrap();
        for waiter in waiters {
            waiter.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_tokens_and_fires_logout_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "detail": {"error": "INVALID_REFRESH_TOKEN", "message": "Token inválido o expirado"}
            })))
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryTokenStore::with_tokens("a1", "r1"));
        let manager = manager_for(&server.uri(), store.clone());

        let logout_count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&logout_count);
        manager.set_logout_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = manager.refresh_access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshRejected { status: 401 }));
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert_eq!(logout_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_session_intact() {
        // Nothing listens here; connection is refused immediately.
        let store = Arc::new(InMemoryTokenStore::with_tokens("a1", "r1"));
        let manager = manager_for("http://127.0.0.1:9", store.clone());

        let logout_count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&logout_count);
        manager.set_logout_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = manager.refresh_access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshUnavailable(_)));
        assert_eq!(store.access_token().as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
        assert_eq!(logout_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_is_terminal() {
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = manager_for("http://127.0.0.1:9", store);

        let logout_count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&logout_count);
        manager.set_logout_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = manager.refresh_access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::NoRefreshToken));
        assert_eq!(logout_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_settles_all_waiters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_delay(std::time::Duration::from_millis(50))
                    .set_body_string("{}"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryTokenStore::with_tokens("a1", "r1"));
        let manager = manager_for(&server.uri(), store);

        let (first, second, third) = tokio::join!(
            manager.refresh_access_token(),
            manager.refresh_access_token(),
            manager.refresh_access_token(),
        );

        // One caller sees the real rejection, the waiters see RefreshFailed;
        // the point is that all three settle.
        assert!(first.is_err());
        assert!(second.is_err());
        assert!(third.is_err());
    }

    #[tokio::test]
    async fn test_logout_callback_last_writer_wins() {
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = manager_for("http://127.0.0.1:9", store);

        let first_fired = Arc::new(AtomicUsize::new(0));
        let second_fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&first_fired);
        manager.set_logout_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&second_fired);
        manager.set_logout_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let _ = manager.refresh_access_token().await;
        assert_eq!(first_fired.load(Ordering::SeqCst), 0);
        assert_eq!(second_fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_valid_access_token_skips_refresh_when_fresh() {
        use base64::Engine;
        use base64::prelude::BASE64_URL_SAFE_NO_PAD;

        let exp = chrono::Utc::now().timestamp() + 900;
        let payload =
            BASE64_URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": exp }).to_string());
        let fresh = format!("header.{payload}.sig");

        // No server running: any refresh attempt would error out.
        let store = Arc::new(InMemoryTokenStore::with_tokens(fresh.clone(), "r1"));
        let manager = manager_for("http://127.0.0.1:9", store);

        assert_eq!(manager.valid_access_token().await.unwrap(), Some(fresh));
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_valid_access_token_refreshes_expired_token() {
        use base64::Engine;
        use base64::prelude::BASE64_URL_SAFE_NO_PAD;

        let server = MockServer::start().await;
        mount_refresh_ok(&server, "fresh-access", "r2").await;

        let exp = chrono::Utc::now().timestamp() - 10;
        let payload =
            BASE64_URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": exp }).to_string());
        let stale = format!("header.{payload}.sig");

        let store = Arc::new(InMemoryTokenStore::with_tokens(stale, "r1"));
        let manager = manager_for(&server.uri(), store);

        assert_eq!(
            manager.valid_access_token().await.unwrap().as_deref(),
            Some("fresh-access")
        );
    }

    #[tokio::test]
    async fn test_valid_access_token_none_when_unauthenticated() {
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = manager_for("http://127.0.0.1:9", store);
        assert!(manager.valid_access_token().await.unwrap().is_none());
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_valid_access_token_surfaces_terminal_refresh_failure() {
        use base64::Engine;
        use base64::prelude::BASE64_URL_SAFE_NO_PAD;

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let exp = chrono::Utc::now().timestamp() - 10;
        let payload =
            BASE64_URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": exp }).to_string());
        let stale = format!("header.{payload}.sig");

        let store = Arc::new(InMemoryTokenStore::with_tokens(stale, "revoked"));
        let manager = manager_for(&server.uri(), store.clone());

        let err = manager.valid_access_token().await.unwrap_err();
        assert!(err.is_terminal());
        assert!(store.access_token().is_none());
    }

    #[tokio::test]
    async fn test_valid_access_token_transport_failure_degrades_to_none() {
        use base64::Engine;
        use base64::prelude::BASE64_URL_SAFE_NO_PAD;

        let exp = chrono::Utc::now().timestamp() - 10;
        let payload =
            BASE64_URL_SAFE_NO_PAD.encode(serde_json::json!({ "exp": exp }).to_string());
        let stale = format!("header.{payload}.sig");

        // Refresh endpoint unreachable: not terminal, session stays stored.
        let store = Arc::new(InMemoryTokenStore::with_tokens(stale, "r1"));
        let manager = manager_for("http://127.0.0.1:9", store.clone());

        assert!(manager.valid_access_token().await.unwrap().is_none());
        assert!(store.refresh_token().is_some());
    }
}
