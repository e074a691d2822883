//! Signed-in cart inspection.
//!
//! Reads go through the same hydration as the storefront, so the output is
//! what the user would see.
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Hosted backend project URL
//! - `BACKEND_SERVICE_KEY` - Service-role key

use dokan_core::UserId;
use dokan_storefront::backend::RestCartStore;
use dokan_storefront::cart::{AuthenticatedBackend, CartBackend, CartSnapshot, Identity};

use super::{CommandError, print_json, service_client};

/// Print a user's cart.
pub async fn show(user: UserId) -> Result<(), CommandError> {
    let (client, service_key) = service_client()?;
    let store = RestCartStore::new(client);
    let backend = AuthenticatedBackend::new(&store, Identity::new(user, service_key));

    let snapshot = CartSnapshot::new(backend.owner(), backend.load().await?);
    tracing::info!(
        user_id = %user,
        lines = snapshot.lines.len(),
        item_count = snapshot.item_count(),
        subtotal = %snapshot.subtotal(),
        "Loaded cart"
    );
    print_json(&snapshot)
}

/// Delete every row of a user's cart.
pub async fn clear(user: UserId) -> Result<(), CommandError> {
    let (client, service_key) = service_client()?;
    let store = RestCartStore::new(client);
    let backend = AuthenticatedBackend::new(&store, Identity::new(user, service_key));

    backend.clear().await?;
    tracing::info!(user_id = %user, "Cart cleared");
    Ok(())
}
