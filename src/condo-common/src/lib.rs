//! Shared utilities for the condo client SDK.

pub mod http_client;
