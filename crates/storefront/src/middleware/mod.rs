//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, URI, status, latency)
//! 3. Request ID (recorded in the request span)
//! 4. Session layer (tower-sessions, `PostgreSQL` or in-memory store)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{clear_current_user, set_current_user};
pub use request_id::request_id_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
