//! Category endpoints.
//!
//! Categories classify transactions as income or expense; their ids are
//! what [`crate::NewTransaction`] expects in `category_id`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::CondoClient;
use crate::api::transactions::TransactionType;
use crate::api::{PageParams, PaginationMeta, with_query};
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    pub description: Option<String>,
    /// Display color as `#RRGGBB`.
    pub color: String,
    pub icon: Option<String>,
    pub is_active: bool,
    /// System categories are seeded by the backend and cannot be deleted.
    pub is_system: bool,
    #[serde(default)]
    pub transaction_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Response body of `GET /categories`.
#[derive(Debug, Deserialize)]
pub struct CategoryListResponse {
    pub data: Vec<Category>,
    pub pagination: PaginationMeta,
}

impl CondoClient {
    /// List active categories, optionally filtered by type.
    ///
    /// The backend orders results by type then name, which is the order a
    /// picker wants to show them in.
    pub async fn list_categories(
        &self,
        page: PageParams,
        category_type: Option<TransactionType>,
    ) -> Result<CategoryListResponse> {
        let path = with_query(
            "/categories",
            &[
                ("page", page.page.to_string()),
                ("limit", page.limit.to_string()),
                (
                    "type",
                    category_type
                        .map(|t| t.as_str().to_string())
                        .unwrap_or_default(),
                ),
            ],
        );
        self.get_json(&path).await
    }

    /// Fetch a single category by id.
    pub async fn get_category(&self, category_id: &str) -> Result<Category> {
        self.get_json(&format!("/categories/{category_id}")).await
    }
}
