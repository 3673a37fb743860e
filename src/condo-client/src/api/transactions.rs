//! Transaction (income/expense) endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::CondoClient;
use crate::api::{PageParams, PaginationMeta, with_query};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Cancelled,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
    Check,
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub status: TransactionStatus,
    pub category_id: String,
    pub category_name: String,
    pub unit_id: Option<String>,
    pub unit_number: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    /// Month the payment applies to (`YYYY-MM`).
    pub fiscal_period: Option<String>,
    pub created_by: String,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate figures returned alongside the transaction list.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_balance: f64,
    pub transaction_count: u64,
}

/// Response body of `GET /transactions`.
#[derive(Debug, Deserialize)]
pub struct TransactionListResponse {
    pub data: Vec<Transaction>,
    pub summary: TransactionSummary,
    pub pagination: PaginationMeta,
}

/// Request body of `POST /transactions`.
#[derive(Debug, Serialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category_id: String,
    pub description: String,
    pub transaction_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_period: Option<String>,
}

impl CondoClient {
    /// List transactions with income/expense totals.
    pub async fn list_transactions(
        &self,
        page: PageParams,
        transaction_type: Option<TransactionType>,
        unit_id: Option<&str>,
    ) -> Result<TransactionListResponse> {
        let path = with_query(
            "/transactions",
            &[
                ("page", page.page.to_string()),
                ("limit", page.limit.to_string()),
                (
                    "type",
                    transaction_type
                        .map(|t| t.as_str().to_string())
                        .unwrap_or_default(),
                ),
                ("unit_id", unit_id.unwrap_or_default().to_string()),
            ],
        );
        self.get_json(&path).await
    }

    /// Record a new transaction.
    pub async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction> {
        self.post_json("/transactions", transaction).await
    }
}
