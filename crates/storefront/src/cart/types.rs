//! Cart state types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dokan_core::{LineId, ProductId, UserId};

use crate::models::Product;

/// Which backend a cart operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartMode {
    /// No identity: lines live in the visitor's local slot.
    Anonymous,
    /// Signed in: lines live in the remote per-user table.
    Authenticated,
}

impl std::fmt::Display for CartMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// The backend (and, for signed-in carts, the user) a snapshot was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "user_id", rename_all = "snake_case")]
pub enum CartOwner {
    #[default]
    Anonymous,
    Authenticated(UserId),
}

impl CartOwner {
    #[must_use]
    pub const fn mode(&self) -> CartMode {
        match self {
            Self::Anonymous => CartMode::Anonymous,
            Self::Authenticated(_) => CartMode::Authenticated,
        }
    }
}

/// A line as persisted in the local slot.
///
/// The product itself is never stored, only its ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl StoredLine {
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// One catalog item's quantity entry in the cart, hydrated with live
/// catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    /// Equal to `product_id` for guest carts, the remote row ID otherwise.
    pub line_id: LineId,
    pub product_id: ProductId,
    /// Always at least 1.
    pub quantity: u32,
    pub product: Option<Product>,
}

impl CartLine {
    /// Unit price, zero when the product is not hydrated.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.product.as_ref().map_or(Decimal::ZERO, |p| p.price)
    }

    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }

    /// Whether more units are in the cart than the catalog has in stock.
    ///
    /// Informational only; the cart never clamps quantities.
    #[must_use]
    pub fn exceeds_stock(&self) -> bool {
        self.product
            .as_ref()
            .is_some_and(|p| i64::from(self.quantity) > i64::from(p.stock_quantity))
    }
}

/// The full cart state handed to callers and observers.
///
/// Snapshots are immutable; every operation publishes a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub owner: CartOwner,
    pub lines: Vec<CartLine>,
}

impl CartSnapshot {
    #[must_use]
    pub const fn new(owner: CartOwner, lines: Vec<CartLine>) -> Self {
        Self { owner, lines }
    }

    #[must_use]
    pub const fn empty(owner: CartOwner) -> Self {
        Self::new(owner, Vec::new())
    }

    #[must_use]
    pub const fn mode(&self) -> CartMode {
        self.owner.mode()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of price x quantity; unhydrated lines count as zero.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    #[must_use]
    pub fn line_for_product(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, stock: i32) -> Product {
        Product {
            id: ProductId::random(),
            name: "Hilsa".to_string(),
            slug: "hilsa".to_string(),
            price: Decimal::new(price, 0),
            images: Vec::new(),
            stock_quantity: stock,
            is_active: true,
        }
    }

    fn line(product: Option<Product>, quantity: u32) -> CartLine {
        let product_id = product.as_ref().map_or_else(ProductId::random, |p| p.id);
        CartLine {
            line_id: LineId::from(product_id),
            product_id,
            quantity,
            product,
        }
    }

    #[test]
    fn test_empty_snapshot_totals() {
        let snapshot = CartSnapshot::default();
        assert_eq!(snapshot.item_count(), 0);
        assert_eq!(snapshot.subtotal(), Decimal::ZERO);
        assert_eq!(snapshot.mode(), CartMode::Anonymous);
    }

    #[test]
    fn test_item_count_and_subtotal() {
        let snapshot = CartSnapshot::new(
            CartOwner::Anonymous,
            vec![line(Some(product(250, 10)), 2), line(Some(product(90, 10)), 3)],
        );
        assert_eq!(snapshot.item_count(), 5);
        assert_eq!(snapshot.subtotal(), Decimal::new(770, 0));
    }

    #[test]
    fn test_missing_product_counts_as_zero() {
        let snapshot = CartSnapshot::new(
            CartOwner::Anonymous,
            vec![line(None, 4), line(Some(product(100, 10)), 1)],
        );
        assert_eq!(snapshot.item_count(), 5);
        assert_eq!(snapshot.subtotal(), Decimal::new(100, 0));
    }

    #[test]
    fn test_exceeds_stock() {
        assert!(line(Some(product(10, 2)), 3).exceeds_stock());
        assert!(!line(Some(product(10, 3)), 3).exceeds_stock());
        assert!(!line(None, 3).exceeds_stock());
    }

    #[test]
    fn test_owner_mode() {
        assert_eq!(
            CartOwner::Authenticated(UserId::random()).mode(),
            CartMode::Authenticated
        );
        assert_eq!(CartMode::Authenticated.to_string(), "authenticated");
    }
}
