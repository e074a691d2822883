//! Storage capabilities the cart depends on.
//!
//! Each trait is implemented twice: against the hosted backend (see
//! [`crate::backend`]) and in memory (see [`super::memory`]).

use std::future::Future;

use serde::Deserialize;

use dokan_core::{CartItemId, ProductId};

use super::coupon::Coupon;
use super::{CartError, Identity, StoredLine};
use crate::backend::BackendError;
use crate::models::Product;

/// Read-only access to the product catalog.
pub trait CatalogReader: Send + Sync {
    /// Fetch every product in `ids` that still exists. Missing IDs are simply
    /// absent from the result.
    fn fetch_products(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<Vec<Product>, BackendError>> + Send;

    fn fetch_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, BackendError>> + Send;
}

/// Per-user cart rows held by the hosted backend.
pub trait RemoteCartStore: Send + Sync {
    /// All rows owned by `identity`, each joined with its product.
    fn fetch_rows(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<Vec<RemoteCartRow>, BackendError>> + Send;

    fn insert_row(
        &self,
        identity: &Identity,
        product_id: ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn update_quantity(
        &self,
        identity: &Identity,
        item_id: CartItemId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn delete_row(
        &self,
        identity: &Identity,
        item_id: CartItemId,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn delete_all(&self, identity: &Identity)
    -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// The visitor-scoped durable slot holding a guest cart.
pub trait LocalSlot: Send + Sync {
    /// The stored line list; empty when nothing was ever stored.
    fn load(&self) -> impl Future<Output = Result<Vec<StoredLine>, CartError>> + Send;

    /// Replace the stored line list.
    fn save(&self, lines: &[StoredLine]) -> impl Future<Output = Result<(), CartError>> + Send;

    /// Remove the slot entirely.
    fn erase(&self) -> impl Future<Output = Result<(), CartError>> + Send;
}

/// Coupon lookup by code.
pub trait CouponReader: Send + Sync {
    /// Find a coupon by its (already normalized) code.
    fn find_coupon(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Option<Coupon>, BackendError>> + Send;
}

/// A remote cart row as returned by the joined select.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCartRow {
    pub id: CartItemId,
    pub product_id: ProductId,
    /// Raw column value; rows below 1 are discarded during hydration.
    pub quantity: i64,
    /// The embedded product, `None` when the join found nothing.
    #[serde(default, rename = "products")]
    pub product: Option<Joined<Product>>,
}

/// An embedded relation, which the backend renders either as a single object
/// or as a collection depending on how it infers the relationship.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Joined<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Joined<T> {
    /// Collapse to a single value: the object itself, or the first element
    /// of a collection.
    pub fn into_single(self) -> Option<T> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.into_iter().next(),
        }
    }
}
