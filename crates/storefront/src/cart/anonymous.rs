//! Guest carts, persisted in the visitor's local slot.

use std::collections::HashMap;

use tracing::{debug, instrument};

use dokan_core::{LineId, ProductId};

use super::backend::CartBackend;
use super::store::{CatalogReader, LocalSlot};
use super::{CartError, CartLine, CartOwner, CartSnapshot, StoredLine};

/// Cart backend for visitors without an identity.
///
/// Lines have no identity of their own; a line's ID is its product ID.
pub struct AnonymousBackend<'a, C, L> {
    catalog: &'a C,
    slot: &'a L,
}

impl<'a, C, L> AnonymousBackend<'a, C, L>
where
    C: CatalogReader,
    L: LocalSlot,
{
    pub const fn new(catalog: &'a C, slot: &'a L) -> Self {
        Self { catalog, slot }
    }

    /// Stored lines with zero quantities dropped and duplicate products merged
    /// into their first occurrence.
    async fn stored_lines(&self) -> Result<Vec<StoredLine>, CartError> {
        let raw = self.slot.load().await?;
        let mut lines: Vec<StoredLine> = Vec::with_capacity(raw.len());

        for line in raw.into_iter().filter(|line| line.quantity > 0) {
            match lines.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => lines.push(line),
            }
        }

        Ok(lines)
    }
}

impl<C, L> CartBackend for AnonymousBackend<'_, C, L>
where
    C: CatalogReader,
    L: LocalSlot,
{
    fn owner(&self) -> CartOwner {
        CartOwner::Anonymous
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<Vec<CartLine>, CartError> {
        let stored = self.stored_lines().await?;
        if stored.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<ProductId> = stored.iter().map(|line| line.product_id).collect();
        let mut products: HashMap<ProductId, _> = self
            .catalog
            .fetch_products(&ids)
            .await?
            .into_iter()
            .filter(|product| product.is_active)
            .map(|product| (product.id, product))
            .collect();

        let lines = stored
            .into_iter()
            .filter_map(|line| {
                let Some(product) = products.remove(&line.product_id) else {
                    debug!(product_id = %line.product_id, "Dropping line for unresolved product");
                    return None;
                };
                Some(CartLine {
                    line_id: LineId::from(line.product_id),
                    product_id: line.product_id,
                    quantity: line.quantity,
                    product: Some(product),
                })
            })
            .collect();

        Ok(lines)
    }

    #[instrument(skip(self, _snapshot), fields(product_id = %product_id))]
    async fn add(
        &self,
        product_id: ProductId,
        quantity: u32,
        _snapshot: &CartSnapshot,
    ) -> Result<(), CartError> {
        let mut lines = self.stored_lines().await?;

        match lines.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => lines.push(StoredLine::new(product_id, quantity)),
        }

        self.slot.save(&lines).await
    }

    #[instrument(skip(self), fields(line_id = %line_id))]
    async fn set_quantity(&self, line_id: LineId, quantity: u32) -> Result<(), CartError> {
        let product_id = line_id.as_product_id();
        let mut lines = self.stored_lines().await?;

        let Some(line) = lines.iter_mut().find(|line| line.product_id == product_id) else {
            debug!("No guest line to update");
            return Ok(());
        };
        line.quantity = quantity;

        self.slot.save(&lines).await
    }

    #[instrument(skip(self), fields(line_id = %line_id))]
    async fn remove(&self, line_id: LineId) -> Result<(), CartError> {
        let product_id = line_id.as_product_id();
        let mut lines = self.stored_lines().await?;

        let before = lines.len();
        lines.retain(|line| line.product_id != product_id);
        if lines.len() == before {
            debug!("No guest line to remove");
            return Ok(());
        }

        self.slot.save(&lines).await
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), CartError> {
        self.slot.erase().await
    }
}
