//! Unit (vivienda) endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CondoClient;
use crate::api::{PageParams, PaginationMeta, with_query};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Occupied,
    Vacant,
    Maintenance,
}

impl UnitStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Occupied => "occupied",
            Self::Vacant => "vacant",
            Self::Maintenance => "maintenance",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Unit {
    pub id: String,
    pub unit_number: String,
    pub building: Option<String>,
    pub floor: Option<i32>,
    pub area_m2: Option<f64>,
    pub status: UnitStatus,
    pub monthly_fee: f64,
    /// Negative when the unit owes money.
    pub balance: f64,
    pub notes: Option<String>,
    pub owner_user_id: Option<String>,
    pub owner_name: Option<String>,
    pub tenant_user_id: Option<String>,
    pub tenant_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate figures returned alongside the unit list.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitSummary {
    pub total_units: u32,
    pub occupied: u32,
    pub vacant: u32,
    pub maintenance: u32,
    pub total_debt: f64,
    pub units_with_debt: u32,
}

/// Response body of `GET /units`.
#[derive(Debug, Deserialize)]
pub struct UnitListResponse {
    pub data: Vec<Unit>,
    pub summary: UnitSummary,
    pub pagination: PaginationMeta,
}

impl CondoClient {
    /// List units with an occupancy/debt summary.
    pub async fn list_units(
        &self,
        page: PageParams,
        status: Option<UnitStatus>,
        search: Option<&str>,
    ) -> Result<UnitListResponse> {
        let path = with_query(
            "/units",
            &[
                ("page", page.page.to_string()),
                ("limit", page.limit.to_string()),
                (
                    "status",
                    status.map(|s| s.as_str().to_string()).unwrap_or_default(),
                ),
                ("search", search.unwrap_or_default().to_string()),
            ],
        );
        self.get_json(&path).await
    }

    /// Fetch a single unit by id.
    pub async fn get_unit(&self, unit_id: &str) -> Result<Unit> {
        self.get_json(&format!("/units/{unit_id}")).await
    }
}
