//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tower_sessions::Session;

use crate::backend::{BackendClient, BackendError, RestCartStore, RestCatalog, RestCoupons};
use crate::cart::{CartService, SessionIdentity, SessionSlot};
use crate::config::StorefrontConfig;

/// The cart as seen by one HTTP request.
pub type StorefrontCart = CartService<SessionIdentity, RestCatalog, RestCartStore, SessionSlot>;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The catalog's product cache is shared by
/// every request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: Option<PgPool>,
    catalog: RestCatalog,
    cart_items: RestCartStore,
    coupons: RestCoupons,
}

impl AppState {
    /// Create a new application state.
    ///
    /// `pool` is the session database, when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is invalid.
    pub fn new(config: StorefrontConfig, pool: Option<PgPool>) -> Result<Self, BackendError> {
        let client = BackendClient::new(&config.backend.url, config.backend.anon_key.clone())?;
        let catalog = RestCatalog::new(client.clone(), config.backend.catalog_cache_ttl);
        let cart_items = RestCartStore::new(client.clone());
        let coupons = RestCoupons::new(client);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                cart_items,
                coupons,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The session database pool, absent with in-memory sessions.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    #[must_use]
    pub fn coupons(&self) -> &RestCoupons {
        &self.inner.coupons
    }

    /// A cart bound to the visitor behind `session`.
    #[must_use]
    pub fn cart(&self, session: &Session) -> StorefrontCart {
        CartService::new(
            SessionIdentity::new(session.clone()),
            self.inner.catalog.clone(),
            self.inner.cart_items.clone(),
            SessionSlot::new(session.clone()),
        )
    }
}
