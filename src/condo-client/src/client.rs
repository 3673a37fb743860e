//! HTTP client with the authenticated request pipeline.
//!
//! Every typed endpoint wrapper funnels through [`CondoClient::execute`],
//! which implements the interceptor chain: attach a bearer token (refreshing
//! first when the stored one is stale), send, and on a 401 refresh and
//! resend exactly once. Routes on the public allow-list skip all of it.

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use condo_auth::{AuthManager, KeyringTokenStore, TokenStore};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};

/// Routes served without authentication. Requests to these never carry an
/// Authorization header and never trigger a refresh, even when a stale
/// token pair is stored.
const PUBLIC_ROUTES: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/refresh",
    "/auth/forgot-password",
    "/auth/verify-reset-code",
    "/auth/reset-password",
];

/// Whether `path` (query string ignored) is on the public allow-list.
fn is_public_route(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    PUBLIC_ROUTES.contains(&path)
}

/// Per-attempt state for one logical request.
///
/// Owned by a single `execute` call; the flag lives here rather than on any
/// shared request object, so concurrent requests cannot observe each
/// other's retry state.
#[derive(Default)]
struct RequestContext {
    /// Set once the post-401 resend has been used up.
    retried: bool,
}

/// Client for the condominium administration backend.
pub struct CondoClient {
    http: reqwest::Client,
    config: ClientConfig,
    auth: Arc<AuthManager>,
}

impl CondoClient {
    /// Create a client with the default configuration and keyring-backed
    /// credential storage.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with a custom configuration and keyring-backed
    /// credential storage.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_token_store(config, Arc::new(KeyringTokenStore::new()))
    }

    /// Create a client with a caller-provided credential store.
    pub fn with_token_store(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let http = condo_common::http_client::create_client_with_timeout(config.timeout)
            .map_err(ApiError::Config)?;
        let auth = Arc::new(AuthManager::with_http_client(
            store,
            &config.base_url,
            http.clone(),
        ));
        Ok(Self { http, config, auth })
    }

    /// The auth manager backing this client.
    ///
    /// Use it to register the forced sign-out callback or to inspect
    /// authentication state.
    pub fn auth(&self) -> &Arc<AuthManager> {
        &self.auth
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_json(Method::GET, path, None).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request_json(Method::POST, path, Some(to_body(body)?))
            .await
    }

    pub(crate) async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request_json(Method::PUT, path, Some(to_body(body)?))
            .await
    }

    /// POST where the caller does not care about the response body.
    pub(crate) async fn post_and_discard<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        self.execute(Method::POST, path, Some(to_body(body)?))
            .await?;
        Ok(())
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let response = self.execute(method, path, body).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Run one logical request through the interceptor chain.
    ///
    /// The body is held as JSON so the post-401 resend reuses it byte for
    /// byte. Returns the response only once it has a success status.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        if is_public_route(path) {
            let response = self.send(&method, path, body.as_ref(), None).await?;
            return check_status(response).await;
        }

        let mut context = RequestContext::default();
        let mut token = match self.auth.valid_access_token().await {
            Ok(token) => token,
            Err(e) => {
                // Terminal refresh failure: the session is already over and
                // logout has been broadcast. Sending the request anyway
                // would just earn a 401 and a second refresh attempt.
                tracing::debug!(path, error = %e, "Session ended during pre-request refresh");
                return Err(ApiError::AuthenticationFailed);
            }
        };

        loop {
            let response = self.send(&method, path, body.as_ref(), token.as_deref()).await?;

            if response.status() == StatusCode::UNAUTHORIZED && !context.retried {
                context.retried = true;

                match self.auth.refresh_access_token().await {
                    Ok(fresh) => {
                        tracing::debug!(path, "Retrying request with refreshed token");
                        token = Some(fresh);
                        continue;
                    }
                    Err(e) => {
                        // Refresh could not produce a usable token; the
                        // terminal-failure cleanup already ran inside it.
                        tracing::debug!(path, error = %e, "Token refresh after 401 failed");
                        return Err(ApiError::AuthenticationFailed);
                    }
                }
            }

            // A second 401 lands here and propagates unmodified, like any
            // other server error.
            return check_status(response).await;
        }
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_response(status.as_u16(), &body))
}
