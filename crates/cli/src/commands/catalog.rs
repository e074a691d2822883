//! Catalog lookups.

use std::time::Duration;

use dokan_core::ProductId;
use dokan_storefront::backend::RestCatalog;
use dokan_storefront::cart::CatalogReader;

use super::{CommandError, print_json, service_client};

/// Print one product.
pub async fn product(id: ProductId) -> Result<(), CommandError> {
    let (client, _) = service_client()?;
    let catalog = RestCatalog::new(client, Duration::ZERO);

    let product = catalog
        .fetch_product(id)
        .await?
        .ok_or_else(|| CommandError::NotFound(format!("product {id}")))?;

    if !product.is_active {
        tracing::warn!(product_id = %id, "Product is inactive and hidden from carts");
    }
    print_json(&product)
}
