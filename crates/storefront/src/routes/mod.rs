//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (session database)
//!
//! # Cart (JSON, mutations send HX-Trigger: cart-updated)
//! GET  /cart                   - Refreshed cart with totals
//! POST /cart/add               - product_id, quantity (default 1)
//! POST /cart/update            - line_id, quantity (<= 0 removes)
//! POST /cart/remove            - line_id
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - {"count": n}
//! POST /cart/coupon            - code
//! POST /cart/coupon/remove     - Forget the applied coupon
//! ```

pub mod cart;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/coupon", post(cart::apply_coupon))
        .route("/coupon/remove", post(cart::remove_coupon))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/cart", cart_routes())
}
