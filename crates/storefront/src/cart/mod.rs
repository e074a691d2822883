//! The cart consistency component.
//!
//! A cart lives in one of two places. Guests keep `(product, quantity)` pairs
//! in a local slot scoped to their session; signed-in users keep rows in the
//! hosted `cart_items` table. [`CartService`] asks its [`IdentitySource`] on
//! every operation which of the two is authoritative, performs the operation
//! against that backend, re-reads and hydrates the lines from the catalog, and
//! publishes the resulting [`CartSnapshot`] to subscribers.
//!
//! Guest lines are not carried over when a visitor signs in; the remote cart
//! simply becomes authoritative.
//!
//! # Example
//!
//! ```rust,ignore
//! let cart = CartService::new(identity, catalog, remote, slot);
//! let mut updates = cart.subscribe();
//!
//! cart.add_to_cart(product_id, 2).await?;
//! assert_eq!(cart.item_count(), 2);
//! assert!(updates.has_changed()?);
//! ```

mod anonymous;
mod authenticated;
mod backend;
pub mod coupon;
mod identity;
pub mod memory;
mod service;
mod session;
mod store;
mod types;

use thiserror::Error;

use crate::backend::BackendError;

pub use anonymous::AnonymousBackend;
pub use authenticated::AuthenticatedBackend;
pub use backend::{ActiveBackend, CartBackend, select_backend};
pub use coupon::{CartTotals, Coupon, CouponError, DiscountType, normalize_code};
pub use identity::{Identity, IdentitySource, SharedIdentity};
pub use service::CartService;
pub use session::{SessionIdentity, SessionSlot};
pub use store::{CatalogReader, CouponReader, Joined, LocalSlot, RemoteCartRow, RemoteCartStore};
pub use types::{CartLine, CartMode, CartOwner, CartSnapshot, StoredLine};

/// A failed cart operation.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}
