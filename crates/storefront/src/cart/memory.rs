//! In-process implementations of the cart's storage capabilities.
//!
//! Used by tests and local tooling. Every store can be switched to an
//! unavailable state to exercise the cart's soft-failure paths, and clones
//! share state.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use dokan_core::{CartItemId, ProductId, UserId};

use super::coupon::{Coupon, normalize_code};
use super::store::{CatalogReader, CouponReader, Joined, LocalSlot, RemoteCartRow, RemoteCartStore};
use super::{CartError, Identity, StoredLine};
use crate::backend::BackendError;
use crate::models::Product;

fn unavailable(store: &str) -> BackendError {
    BackendError::Unavailable(format!("{store} is offline"))
}

/// A product with a random ID, priced in whole taka and well stocked.
#[must_use]
pub fn sample_product(name: &str, price: i64) -> Product {
    Product {
        id: ProductId::random(),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        price: Decimal::new(price, 0),
        images: Vec::new(),
        stock_quantity: 100,
        is_active: true,
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Clone, Default)]
pub struct MemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a product, returning it.
    pub async fn insert(&self, product: Product) -> Product {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        product
    }

    pub async fn remove(&self, id: ProductId) {
        self.products.write().await.remove(&id);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable("catalog"));
        }
        Ok(())
    }
}

impl CatalogReader for MemoryCatalog {
    async fn fetch_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, BackendError> {
        self.check()?;
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        self.check()?;
        Ok(self.products.read().await.get(&id).cloned())
    }
}

// =============================================================================
// Remote cart rows
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct MemoryRow {
    id: CartItemId,
    user_id: UserId,
    product_id: ProductId,
    quantity: u32,
}

/// Per-user cart rows joined against a [`MemoryCatalog`].
#[derive(Clone)]
pub struct MemoryCartStore {
    rows: Arc<RwLock<Vec<MemoryRow>>>,
    catalog: MemoryCatalog,
    joins_as_collections: bool,
    unavailable: Arc<AtomicBool>,
}

impl MemoryCartStore {
    #[must_use]
    pub fn new(catalog: MemoryCatalog) -> Self {
        Self {
            rows: Arc::default(),
            catalog,
            joins_as_collections: false,
            unavailable: Arc::default(),
        }
    }

    /// Render joined products as one-element collections instead of objects.
    #[must_use]
    pub const fn with_collection_joins(mut self) -> Self {
        self.joins_as_collections = true;
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// `(row, product, quantity)` for every row owned by `user_id`.
    pub async fn rows_for(&self, user_id: UserId) -> Vec<(CartItemId, ProductId, u32)> {
        self.rows
            .read()
            .await
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| (row.id, row.product_id, row.quantity))
            .collect()
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable("cart store"));
        }
        Ok(())
    }
}

impl RemoteCartStore for MemoryCartStore {
    async fn fetch_rows(&self, identity: &Identity) -> Result<Vec<RemoteCartRow>, BackendError> {
        self.check()?;
        let owned: Vec<MemoryRow> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|row| row.user_id == identity.user_id())
            .copied()
            .collect();

        let products = self.catalog.products.read().await;
        Ok(owned
            .into_iter()
            .map(|row| {
                let product = products.get(&row.product_id).cloned();
                RemoteCartRow {
                    id: row.id,
                    product_id: row.product_id,
                    quantity: i64::from(row.quantity),
                    product: product.map(|p| {
                        if self.joins_as_collections {
                            Joined::Many(vec![p])
                        } else {
                            Joined::One(p)
                        }
                    }),
                }
            })
            .collect())
    }

    async fn insert_row(
        &self,
        identity: &Identity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        self.check()?;
        self.rows.write().await.push(MemoryRow {
            id: CartItemId::random(),
            user_id: identity.user_id(),
            product_id,
            quantity,
        });
        Ok(())
    }

    async fn update_quantity(
        &self,
        identity: &Identity,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        self.check()?;
        let mut rows = self.rows.write().await;
        if let Some(row) = rows
            .iter_mut()
            .find(|row| row.id == item_id && row.user_id == identity.user_id())
        {
            row.quantity = quantity;
        }
        Ok(())
    }

    async fn delete_row(&self, identity: &Identity, item_id: CartItemId) -> Result<(), BackendError> {
        self.check()?;
        self.rows
            .write()
            .await
            .retain(|row| !(row.id == item_id && row.user_id == identity.user_id()));
        Ok(())
    }

    async fn delete_all(&self, identity: &Identity) -> Result<(), BackendError> {
        self.check()?;
        self.rows
            .write()
            .await
            .retain(|row| row.user_id != identity.user_id());
        Ok(())
    }
}

// =============================================================================
// Local slot
// =============================================================================

/// A local slot; `None` means nothing has been stored yet.
#[derive(Clone, Default)]
pub struct MemorySlot {
    lines: Arc<RwLock<Option<Vec<StoredLine>>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemorySlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_lines(lines: Vec<StoredLine>) -> Self {
        Self {
            lines: Arc::new(RwLock::new(Some(lines))),
            unavailable: Arc::default(),
        }
    }

    pub async fn stored(&self) -> Option<Vec<StoredLine>> {
        self.lines.read().await.clone()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CartError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable("local slot").into());
        }
        Ok(())
    }
}

impl LocalSlot for MemorySlot {
    async fn load(&self) -> Result<Vec<StoredLine>, CartError> {
        self.check()?;
        Ok(self.lines.read().await.clone().unwrap_or_default())
    }

    async fn save(&self, lines: &[StoredLine]) -> Result<(), CartError> {
        self.check()?;
        *self.lines.write().await = Some(lines.to_vec());
        Ok(())
    }

    async fn erase(&self) -> Result<(), CartError> {
        self.check()?;
        *self.lines.write().await = None;
        Ok(())
    }
}

// =============================================================================
// Coupons
// =============================================================================

#[derive(Clone, Default)]
pub struct MemoryCoupons {
    coupons: Arc<RwLock<HashMap<String, Coupon>>>,
}

impl MemoryCoupons {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, coupon: Coupon) {
        self.coupons
            .write()
            .await
            .insert(normalize_code(&coupon.code), coupon);
    }
}

impl CouponReader for MemoryCoupons {
    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, BackendError> {
        Ok(self.coupons.read().await.get(code).cloned())
    }
}
