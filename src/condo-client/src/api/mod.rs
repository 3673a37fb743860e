//! Typed endpoint wrappers.
//!
//! One module per backend router. Each adds methods to
//! [`crate::CondoClient`]; all of them go through the authenticated request
//! pipeline in `client.rs`.

pub mod auth;
pub mod categories;
pub mod transactions;
pub mod units;
pub mod users;

use serde::Deserialize;

/// Pagination metadata returned by every list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Page selection for list endpoints.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

/// Append a query string to `path`, skipping pairs with empty values.
pub(crate) fn with_query(path: &str, pairs: &[(&str, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        if !value.is_empty() {
            serializer.append_pair(key, value);
        }
    }
    let query = serializer.finish();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}
