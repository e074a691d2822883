//! Product catalog reads from the hosted `products` table.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, instrument};

use dokan_core::ProductId;

use super::cache::ProductCache;
use super::client::{BackendClient, Bearer, Filter};
use super::BackendError;
use crate::cart::CatalogReader;
use crate::models::{PRODUCT_COLUMNS, Product};

const PRODUCTS_TABLE: &str = "products";

/// Catalog reader over the backend's public `products` table.
///
/// Single-product reads are cached for `cache_ttl`. Bulk reads always go to
/// the backend and refresh the cached entries they touch.
#[derive(Clone)]
pub struct RestCatalog {
    client: BackendClient,
    cache: ProductCache,
}

impl RestCatalog {
    #[must_use]
    pub fn new(client: BackendClient, cache_ttl: Duration) -> Self {
        Self {
            client,
            cache: ProductCache::new(cache_ttl),
        }
    }
}

impl CatalogReader for RestCatalog {
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn fetch_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, BackendError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let products: Vec<Product> = self
            .client
            .select(
                PRODUCTS_TABLE,
                PRODUCT_COLUMNS,
                &[Filter::any_of("id", ids)],
                Bearer::ApiKey,
            )
            .await?;

        let found: HashSet<ProductId> = products.iter().map(|p| p.id).collect();
        for id in ids.iter().filter(|id| !found.contains(id)) {
            self.cache.invalidate(id).await;
        }
        for product in &products {
            self.cache.insert(product.clone()).await;
        }

        debug!(found = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        if let Some(product) = self.cache.get(&id).await {
            debug!("Cache hit for product");
            return Ok(Some(Product::clone(&product)));
        }

        let product = self
            .client
            .select::<Product>(
                PRODUCTS_TABLE,
                PRODUCT_COLUMNS,
                &[Filter::eq("id", id)],
                Bearer::ApiKey,
            )
            .await?
            .into_iter()
            .next();

        if let Some(product) = &product {
            self.cache.insert(product.clone()).await;
        }
        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use httpmock::prelude::*;
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    const RICE: &str = "5a1f4b1e-93c2-4c57-a7a0-7d2e8c3b9f10";
    const DAL: &str = "6b2a5c2f-a4d3-4d68-b8b1-8e3f9d4c0a21";

    fn product_json(id: &str, name: &str, price: u32) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "slug": name.to_lowercase().replace(' ', "-"),
            "price": price,
            "images": ["https://cdn.example.com.bd/p.jpg"],
            "stock_quantity": 12,
            "is_active": true
        })
    }

    fn catalog(server: &MockServer, ttl: Duration) -> RestCatalog {
        let client = BackendClient::new(&server.base_url(), SecretString::from("anon-key")).unwrap();
        RestCatalog::new(client, ttl)
    }

    #[tokio::test]
    async fn test_fetch_products_uses_in_filter() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/products")
                    .query_param("select", PRODUCT_COLUMNS)
                    .query_param("id", format!("in.({RICE},{DAL})"))
                    .header("apikey", "anon-key")
                    .header("authorization", "Bearer anon-key");
                then.status(200)
                    .json_body(json!([product_json(RICE, "Miniket Rice", 78)]));
            })
            .await;

        let catalog = catalog(&server, Duration::ZERO);
        let products = catalog
            .fetch_products(&[RICE.parse().unwrap(), DAL.parse().unwrap()])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Miniket Rice");
    }

    #[tokio::test]
    async fn test_fetch_products_empty_ids_skips_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/products");
                then.status(200).json_body(json!([]));
            })
            .await;

        let products = catalog(&server, Duration::ZERO)
            .fetch_products(&[])
            .await
            .unwrap();

        assert!(products.is_empty());
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_fetch_product_is_cached() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/products")
                    .query_param("id", format!("eq.{RICE}"));
                then.status(200)
                    .json_body(json!([product_json(RICE, "Miniket Rice", 78)]));
            })
            .await;

        let catalog = catalog(&server, Duration::from_secs(60));
        let id: ProductId = RICE.parse().unwrap();
        let first = catalog.fetch_product(id).await.unwrap();
        let second = catalog.fetch_product(id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_fetch_missing_product() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/products");
                then.status(200).json_body(json!([]));
            })
            .await;

        let product = catalog(&server, Duration::ZERO)
            .fetch_product(ProductId::random())
            .await
            .unwrap();
        assert!(product.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/products");
                then.status(503).body("service unavailable");
            })
            .await;

        let result = catalog(&server, Duration::ZERO)
            .fetch_products(&[ProductId::random()])
            .await;
        assert!(matches!(result, Err(BackendError::Api { status: 503, .. })));
    }
}
