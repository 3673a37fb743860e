//! Authentication endpoints.
//!
//! `login` and `logout` are the two calls that mutate the stored token
//! pair; everything else here is stateless from the client's point of view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CondoClient;
use crate::error::Result;

/// Authenticated user as returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub unit_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Resident,
    Accountant,
}

/// Response body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
}

/// Request body of `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<String>,
}

impl CondoClient {
    /// Log in with email and password.
    ///
    /// On success the returned token pair is persisted in the credential
    /// store, so subsequent requests authenticate automatically.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let response: LoginResponse = self
            .post_json(
                "/auth/login",
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await?;

        self.auth()
            .store_tokens(&response.access_token, &response.refresh_token);
        tracing::info!(user_id = %response.user.id, "Logged in");

        Ok(response)
    }

    /// Register a new resident account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        self.post_json("/auth/register", request).await
    }

    /// Log out and clear the stored token pair.
    ///
    /// The server call revokes the refresh token and is best effort: a
    /// failure is logged but the local session is cleared regardless, so
    /// logout always leaves the client unauthenticated.
    pub async fn logout(&self, all_devices: bool) -> Result<()> {
        let refresh_token = self.auth().store().refresh_token();
        let body = serde_json::json!({
            "refresh_token": refresh_token,
            "all_devices": all_devices,
        });

        if let Err(e) = self.post_and_discard("/auth/logout", &body).await {
            tracing::warn!(error = %e, "Server-side logout failed, clearing local session anyway");
        }

        self.auth().clear_session();
        tracing::info!("Logged out");
        Ok(())
    }

    /// Request a password recovery code by email.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        self.post_and_discard("/auth/forgot-password", &serde_json::json!({ "email": email }))
            .await
    }

    /// Verify a six-digit recovery code before allowing a reset.
    pub async fn verify_reset_code(&self, email: &str, code: &str) -> Result<()> {
        self.post_and_discard(
            "/auth/verify-reset-code",
            &serde_json::json!({ "email": email, "code": code }),
        )
        .await
    }

    /// Reset the password using a verified recovery code.
    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<()> {
        self.post_and_discard(
            "/auth/reset-password",
            &serde_json::json!({
                "email": email,
                "code": code,
                "new_password": new_password,
            }),
        )
        .await
    }
}
