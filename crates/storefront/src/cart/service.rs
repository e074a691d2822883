//! The cart service: per-operation backend selection, refresh-after-write and
//! snapshot publication.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use dokan_core::{LineId, ProductId};

use super::backend::{ActiveBackend, CartBackend, select_backend};
use super::store::{CatalogReader, LocalSlot, RemoteCartStore};
use super::{CartError, CartSnapshot, IdentitySource};

/// A cart bound to one visitor's identity source and storage.
///
/// Mutations return the refreshed snapshot. When a backend call fails the
/// error is logged and returned, and the published snapshot stays as it was.
pub struct CartService<I, C, R, L> {
    identity: I,
    catalog: C,
    remote: R,
    local: L,
    snapshot: watch::Sender<Arc<CartSnapshot>>,
}

impl<I, C, R, L> CartService<I, C, R, L>
where
    I: IdentitySource,
    C: CatalogReader,
    R: RemoteCartStore,
    L: LocalSlot,
{
    /// Create a cart with an empty guest snapshot. Call [`Self::refresh`] to
    /// load the stored state.
    pub fn new(identity: I, catalog: C, remote: R, local: L) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(CartSnapshot::default()));
        Self {
            identity,
            catalog,
            remote,
            local,
            snapshot,
        }
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CartSnapshot> {
        self.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.snapshot.borrow().item_count()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.snapshot.borrow().subtotal()
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CartSnapshot>> {
        self.snapshot.subscribe()
    }

    async fn backend(&self) -> ActiveBackend<'_, C, R, L> {
        let identity = self.identity.current().await;
        select_backend(identity, &self.catalog, &self.remote, &self.local)
    }

    fn publish(&self, snapshot: CartSnapshot) -> Arc<CartSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.snapshot.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    async fn reload(&self, backend: &ActiveBackend<'_, C, R, L>) -> Arc<CartSnapshot> {
        let owner = backend.owner();
        let snapshot = match backend.load().await {
            Ok(lines) => CartSnapshot::new(owner, lines),
            Err(e) => {
                warn!(error = %e, mode = %owner.mode(), "Failed to load cart, showing it empty");
                CartSnapshot::empty(owner)
            }
        };
        self.publish(snapshot)
    }

    /// Re-read the whole cart from the authoritative backend.
    ///
    /// Never fails: a load error publishes an empty cart for the current
    /// mode.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Arc<CartSnapshot> {
        let backend = self.backend().await;
        self.reload(&backend).await
    }

    /// Add `quantity` units of a product. Adding zero does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the authoritative backend rejects the write.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Arc<CartSnapshot>, CartError> {
        if quantity == 0 {
            debug!("Ignoring add of zero units");
            return Ok(self.snapshot());
        }

        let backend = self.backend().await;
        let current = self.snapshot();
        if let Err(e) = backend.add(product_id, quantity, &current).await {
            warn!(error = %e, mode = %backend.owner().mode(), "Failed to add to cart");
            return Err(e);
        }

        Ok(self.reload(&backend).await)
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the authoritative backend rejects the write.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_quantity(
        &self,
        line_id: LineId,
        quantity: i64,
    ) -> Result<Arc<CartSnapshot>, CartError> {
        if quantity <= 0 {
            return self.remove_item(line_id).await;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let backend = self.backend().await;
        if let Err(e) = backend.set_quantity(line_id, quantity).await {
            warn!(error = %e, mode = %backend.owner().mode(), "Failed to update cart quantity");
            return Err(e);
        }

        Ok(self.reload(&backend).await)
    }

    /// Remove a line. Removing a line that is not in the cart does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the authoritative backend rejects the write.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_item(&self, line_id: LineId) -> Result<Arc<CartSnapshot>, CartError> {
        let backend = self.backend().await;
        if let Err(e) = backend.remove(line_id).await {
            warn!(error = %e, mode = %backend.owner().mode(), "Failed to remove cart line");
            return Err(e);
        }

        Ok(self.reload(&backend).await)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the authoritative backend rejects the write.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<Arc<CartSnapshot>, CartError> {
        let backend = self.backend().await;
        let owner = backend.owner();
        if let Err(e) = backend.clear().await {
            warn!(error = %e, mode = %owner.mode(), "Failed to clear cart");
            return Err(e);
        }

        Ok(self.publish(CartSnapshot::empty(owner)))
    }
}
