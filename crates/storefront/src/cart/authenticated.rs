//! Signed-in carts, persisted as per-user rows in the hosted backend.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use dokan_core::{LineId, ProductId};

use super::backend::CartBackend;
use super::store::{Joined, RemoteCartRow, RemoteCartStore};
use super::{CartError, CartLine, CartOwner, CartSnapshot, Identity};

/// Cart backend for a signed-in user.
pub struct AuthenticatedBackend<'a, R> {
    remote: &'a R,
    identity: Identity,
}

impl<'a, R: RemoteCartStore> AuthenticatedBackend<'a, R> {
    pub const fn new(remote: &'a R, identity: Identity) -> Self {
        Self { remote, identity }
    }

    /// The existing row for `product_id` as `(line, quantity)`.
    ///
    /// A line in `snapshot` is trusted only when the snapshot was read for
    /// this same user. Otherwise the raw rows are consulted, including rows
    /// hidden from the cart because their product is inactive or missing, so
    /// that an add never creates a second row for one product.
    async fn existing_line(
        &self,
        product_id: ProductId,
        snapshot: &CartSnapshot,
    ) -> Result<Option<(LineId, u32)>, CartError> {
        if snapshot.owner == self.owner()
            && let Some(line) = snapshot.line_for_product(product_id)
        {
            return Ok(Some((line.line_id, line.quantity)));
        }

        debug!("No visible line for product, checking stored rows before add");
        Ok(self
            .remote
            .fetch_rows(&self.identity)
            .await?
            .into_iter()
            .find(|row| row.product_id == product_id)
            .map(|row| {
                (
                    LineId::from(row.id),
                    u32::try_from(row.quantity).unwrap_or(0),
                )
            }))
    }
}

/// Turn fetched rows into lines, dropping rows whose product does not resolve
/// and rows repeating a product already seen.
fn hydrate_rows(rows: Vec<RemoteCartRow>) -> Vec<CartLine> {
    let mut seen = HashSet::new();

    rows.into_iter()
        .filter_map(|row| {
            let Ok(quantity) = u32::try_from(row.quantity) else {
                warn!(line_id = %row.id, quantity = row.quantity, "Ignoring cart row with invalid quantity");
                return None;
            };
            if quantity == 0 {
                warn!(line_id = %row.id, "Ignoring cart row with zero quantity");
                return None;
            }

            let product = row
                .product
                .and_then(Joined::into_single)
                .filter(|product| product.is_active);
            let Some(product) = product else {
                debug!(line_id = %row.id, product_id = %row.product_id, "Dropping line for unresolved product");
                return None;
            };

            if !seen.insert(row.product_id) {
                warn!(line_id = %row.id, product_id = %row.product_id, "Ignoring duplicate cart row for product");
                return None;
            }

            Some(CartLine {
                line_id: LineId::from(row.id),
                product_id: row.product_id,
                quantity,
                product: Some(product),
            })
        })
        .collect()
}

impl<R: RemoteCartStore> CartBackend for AuthenticatedBackend<'_, R> {
    fn owner(&self) -> CartOwner {
        CartOwner::Authenticated(self.identity.user_id())
    }

    #[instrument(skip(self), fields(user_id = %self.identity.user_id()))]
    async fn load(&self) -> Result<Vec<CartLine>, CartError> {
        let rows = self.remote.fetch_rows(&self.identity).await?;
        Ok(hydrate_rows(rows))
    }

    #[instrument(skip(self, snapshot), fields(user_id = %self.identity.user_id(), product_id = %product_id))]
    async fn add(
        &self,
        product_id: ProductId,
        quantity: u32,
        snapshot: &CartSnapshot,
    ) -> Result<(), CartError> {
        match self.existing_line(product_id, snapshot).await? {
            Some((line_id, existing)) => {
                self.set_quantity(line_id, existing.saturating_add(quantity))
                    .await
            }
            None => {
                self.remote
                    .insert_row(&self.identity, product_id, quantity)
                    .await?;
                Ok(())
            }
        }
    }

    #[instrument(skip(self), fields(user_id = %self.identity.user_id(), line_id = %line_id))]
    async fn set_quantity(&self, line_id: LineId, quantity: u32) -> Result<(), CartError> {
        self.remote
            .update_quantity(&self.identity, line_id.as_cart_item_id(), quantity)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %self.identity.user_id(), line_id = %line_id))]
    async fn remove(&self, line_id: LineId) -> Result<(), CartError> {
        self.remote
            .delete_row(&self.identity, line_id.as_cart_item_id())
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %self.identity.user_id()))]
    async fn clear(&self) -> Result<(), CartError> {
        self.remote.delete_all(&self.identity).await?;
        Ok(())
    }
}
