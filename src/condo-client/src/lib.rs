//! Condo Client - HTTP client SDK for the condominium administration
//! backend.
//!
//! Wraps every endpoint behind an authenticated request pipeline:
//! requests to protected routes carry a bearer token, a stale token is
//! refreshed before sending, and a 401 triggers exactly one refresh-and-
//! resend. Authentication state lives in `condo-auth`.
//!
//! # Example
//!
//! ```no_run
//! use condo_client::{ClientConfig, CondoClient};
//!
//! # async fn run() -> condo_client::Result<()> {
//! let client = CondoClient::with_config(ClientConfig::new("https://backend.example/v1"))?;
//! client.login("admin@example.com", "Secret123").await?;
//! let units = client.list_units(Default::default(), None, None).await?;
//! println!("{} units", units.summary.total_units);
//! # Ok(())
//! # }
//! ```

pub mod api;
mod client;
mod config;
mod error;

pub use api::auth::{LoginResponse, RegisterRequest, User, UserRole};
pub use api::categories::{Category, CategoryListResponse};
pub use api::transactions::{
    NewTransaction, PaymentMethod, Transaction, TransactionListResponse, TransactionStatus,
    TransactionSummary, TransactionType,
};
pub use api::units::{Unit, UnitListResponse, UnitStatus, UnitSummary};
pub use api::users::ProfileUpdate;
pub use api::{PageParams, PaginationMeta};
pub use client::CondoClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, REQUEST_TIMEOUT};
pub use error::{ApiError, Result};
