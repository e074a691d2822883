//! Catalog product types.
//!
//! The catalog is owned by the hosted backend; these are read-only views of
//! its `products` rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dokan_core::ProductId;

/// Columns requested whenever a product is read, alone or embedded in a join.
pub const PRODUCT_COLUMNS: &str = "id,name,slug,price,images,stock_quantity,is_active";

/// A catalog product as denormalized into cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    /// Unit price in taka.
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    /// Deactivated products are treated as if they no longer exist.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl Product {
    /// The first image, used as the cart thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}
