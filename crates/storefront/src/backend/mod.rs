//! Client for the hosted backend-as-a-service.
//!
//! # Architecture
//!
//! - The hosted backend exposes its tables over a PostgREST-style REST API
//!   (`/rest/v1/{table}`), filtered with `column=eq.value` and
//!   `column=in.(a,b)` query parameters
//! - The backend is the source of truth for products, coupons and signed-in
//!   carts - NO local sync, direct API calls
//! - Every request carries the project `apikey`; the bearer token is either
//!   the same key (public catalog reads) or the signed-in user's access
//!   token, so row-level security scopes cart rows to their owner
//! - Single-product reads are cached in memory via `moka`
//!
//! # Example
//!
//! ```rust,ignore
//! use dokan_storefront::backend::{BackendClient, RestCatalog};
//!
//! let client = BackendClient::new(&config.backend.url, config.backend.anon_key.clone())?;
//! let catalog = RestCatalog::new(client.clone(), config.backend.catalog_cache_ttl);
//! let products = catalog.fetch_products(&[product_id]).await?;
//! ```

mod cache;
mod cart_items;
mod catalog;
mod client;
mod coupons;

pub use cart_items::RestCartStore;
pub use catalog::RestCatalog;
pub use client::{BackendClient, Bearer, Filter};
pub use coupons::RestCoupons;

use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend rejected the request.
    #[error("{}", format_api_error(*.status, .code.as_deref(), .message))]
    Api {
        /// HTTP status code.
        status: u16,
        /// PostgREST / Postgres error code, when provided.
        code: Option<String>,
        /// Human-readable message from the backend.
        message: String,
    },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The configured backend URL cannot be used.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The store is temporarily unavailable.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

fn format_api_error(status: u16, code: Option<&str>, message: &str) -> String {
    let message = if message.is_empty() {
        "(no error details provided)"
    } else {
        message
    };

    match code {
        Some(code) => format!("Backend error {status} [{code}]: {message}"),
        None => format!("Backend error {status}: {message}"),
    }
}
