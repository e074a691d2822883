//! Subcommand implementations.

pub mod cart;
pub mod catalog;
pub mod migrate;

use dokan_storefront::backend::{BackendClient, BackendError};
use dokan_storefront::cart::CartError;
use dokan_storefront::config::{ConfigError, get_required_env, get_validated_secret};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// A backend client authorized with the service key, plus that key.
fn service_client() -> Result<(BackendClient, SecretString), CommandError> {
    dotenvy::dotenv().ok();

    let url = get_required_env("BACKEND_URL")?;
    let service_key = get_validated_secret("BACKEND_SERVICE_KEY")?;
    let client = BackendClient::new(&url, service_key.clone())?;
    Ok((client, service_key))
}

/// Print pretty JSON to stdout.
#[allow(clippy::print_stdout)]
fn print_json(value: &impl serde::Serialize) -> Result<(), CommandError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
