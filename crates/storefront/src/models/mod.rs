//! Domain models for storefront.

pub mod product;
pub mod session;

pub use product::{PRODUCT_COLUMNS, Product};
pub use session::{CurrentUser, keys as session_keys};
