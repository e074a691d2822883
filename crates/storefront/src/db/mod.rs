//! `PostgreSQL` access for the storefront.
//!
//! The database holds server-side sessions only (including guest carts and
//! the signed-in user). Products, coupons and signed-in carts live in the
//! hosted backend.
//!
//! # Tables
//!
//! - `tower_sessions.session` - created by the session store migration:
//!
//! ```bash
//! cargo run -p dokan-cli -- migrate sessions
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Round-trip a trivial query.
///
/// # Errors
///
/// Returns `sqlx::Error` if the database is unreachable.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
