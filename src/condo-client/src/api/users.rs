//! Current-user profile endpoints.

use serde::Serialize;

use crate::CondoClient;
use crate::api::auth::User;
use crate::error::Result;

/// Request body of `PUT /auth/me`.
#[derive(Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CondoClient {
    /// Fetch the authenticated user's profile.
    pub async fn me(&self) -> Result<User> {
        self.get_json("/auth/me").await
    }

    /// Update the authenticated user's profile.
    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<User> {
        self.put_json("/auth/me", update).await
    }

    /// Change the authenticated user's password.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let body = serde_json::json!({
            "current_password": current_password,
            "new_password": new_password,
        });
        let _: serde_json::Value = self.put_json("/auth/me/password", &body).await?;
        Ok(())
    }
}
