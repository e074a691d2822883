//! Dokan CLI - session migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! dokan migrate sessions
//!
//! # Inspect or empty a signed-in user's cart
//! dokan cart show --user 0f9e8d7c-6b5a-4f3e-9d2c-1b0a9f8e7d6c
//! dokan cart clear --user 0f9e8d7c-6b5a-4f3e-9d2c-1b0a9f8e7d6c
//!
//! # Print one catalog product
//! dokan catalog product 5a1f4b1e-93c2-4c57-a7a0-7d2e8c3b9f10
//! ```
//!
//! Cart and catalog commands use `BACKEND_SERVICE_KEY`, which bypasses
//! row-level security.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use dokan_core::{ProductId, UserId};

mod commands;

#[derive(Parser)]
#[command(name = "dokan")]
#[command(author, version, about = "Dokan operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Inspect and manage signed-in carts
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Read the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the tower-sessions table
    Sessions,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print a user's hydrated cart as JSON
    Show {
        /// Auth provider user ID
        #[arg(short, long)]
        user: UserId,
    },
    /// Delete every row of a user's cart
    Clear {
        /// Auth provider user ID
        #[arg(short, long)]
        user: UserId,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Print one product as JSON
    Product {
        /// Product ID
        id: ProductId,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show { user } => commands::cart::show(user).await?,
            CartAction::Clear { user } => commands::cart::clear(user).await?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Product { id } => commands::catalog::product(id).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_show() {
        let cli = Cli::try_parse_from([
            "dokan",
            "cart",
            "show",
            "--user",
            "0f9e8d7c-6b5a-4f3e-9d2c-1b0a9f8e7d6c",
        ])
        .expect("valid arguments");

        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Show { user }
            } if user.to_string() == "0f9e8d7c-6b5a-4f3e-9d2c-1b0a9f8e7d6c"
        ));
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!(Cli::try_parse_from(["dokan", "catalog", "product", "not-a-uuid"]).is_err());
    }
}
