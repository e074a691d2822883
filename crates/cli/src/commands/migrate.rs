//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! dokan migrate sessions
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string for the session store

use dokan_storefront::config::{ConfigError, get_optional_database_url};
use dokan_storefront::db;
use tower_sessions_sqlx_store::PostgresStore;

use super::CommandError;

/// Create the `tower_sessions` schema and session table.
pub async fn sessions() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let database_url = get_optional_database_url("STOREFRONT_DATABASE_URL").ok_or_else(|| {
        ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string())
    })?;

    tracing::info!("Connecting to session database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Session store migration complete!");
    Ok(())
}
