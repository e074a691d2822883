//! In-memory cache for catalog reads.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use dokan_core::ProductId;

use crate::models::Product;

/// Maximum number of products kept in memory.
const MAX_CACHED_PRODUCTS: u64 = 1000;

/// Product cache keyed by ID.
///
/// A TTL of zero disables caching entirely.
#[derive(Clone)]
pub struct ProductCache {
    inner: Option<Cache<ProductId, Arc<Product>>>,
}

impl ProductCache {
    pub fn new(ttl: Duration) -> Self {
        let inner = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(MAX_CACHED_PRODUCTS)
                .time_to_live(ttl)
                .build()
        });
        Self { inner }
    }

    pub async fn get(&self, id: &ProductId) -> Option<Arc<Product>> {
        match &self.inner {
            Some(cache) => cache.get(id).await,
            None => None,
        }
    }

    pub async fn insert(&self, product: Product) {
        if let Some(cache) = &self.inner {
            cache.insert(product.id, Arc::new(product)).await;
        }
    }

    pub async fn invalidate(&self, id: &ProductId) {
        if let Some(cache) = &self.inner {
            cache.invalidate(id).await;
        }
    }
}
