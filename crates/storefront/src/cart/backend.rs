//! The backend capability and the per-operation backend selection.

use std::future::Future;

use dokan_core::{LineId, ProductId};

use super::anonymous::AnonymousBackend;
use super::authenticated::AuthenticatedBackend;
use super::store::{CatalogReader, LocalSlot, RemoteCartStore};
use super::{CartError, CartLine, CartOwner, CartSnapshot, Identity};

/// Everything the cart needs from whichever store is authoritative.
///
/// Quantities passed in are already normalized to at least 1.
pub trait CartBackend: Send + Sync {
    /// Who the lines produced by this backend belong to.
    fn owner(&self) -> CartOwner;

    /// Read and hydrate all lines.
    fn load(&self) -> impl Future<Output = Result<Vec<CartLine>, CartError>> + Send;

    /// Add `quantity` units of a product, merging into an existing line.
    ///
    /// `snapshot` is the cart as last published; backends that address lines
    /// by row ID use it to find the existing line.
    fn add(
        &self,
        product_id: ProductId,
        quantity: u32,
        snapshot: &CartSnapshot,
    ) -> impl Future<Output = Result<(), CartError>> + Send;

    fn set_quantity(
        &self,
        line_id: LineId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), CartError>> + Send;

    fn remove(&self, line_id: LineId) -> impl Future<Output = Result<(), CartError>> + Send;

    fn clear(&self) -> impl Future<Output = Result<(), CartError>> + Send;
}

/// The backend chosen for one operation.
pub enum ActiveBackend<'a, C, R, L> {
    Anonymous(AnonymousBackend<'a, C, L>),
    Authenticated(AuthenticatedBackend<'a, R>),
}

/// Pick the authoritative backend: the remote store when an identity is
/// present, the local slot otherwise.
pub fn select_backend<'a, C, R, L>(
    identity: Option<Identity>,
    catalog: &'a C,
    remote: &'a R,
    local: &'a L,
) -> ActiveBackend<'a, C, R, L>
where
    C: CatalogReader,
    R: RemoteCartStore,
    L: LocalSlot,
{
    match identity {
        Some(identity) => ActiveBackend::Authenticated(AuthenticatedBackend::new(remote, identity)),
        None => ActiveBackend::Anonymous(AnonymousBackend::new(catalog, local)),
    }
}

impl<C, R, L> CartBackend for ActiveBackend<'_, C, R, L>
where
    C: CatalogReader,
    R: RemoteCartStore,
    L: LocalSlot,
{
    fn owner(&self) -> CartOwner {
        match self {
            Self::Anonymous(backend) => backend.owner(),
            Self::Authenticated(backend) => backend.owner(),
        }
    }

    async fn load(&self) -> Result<Vec<CartLine>, CartError> {
        match self {
            Self::Anonymous(backend) => backend.load().await,
            Self::Authenticated(backend) => backend.load().await,
        }
    }

    async fn add(
        &self,
        product_id: ProductId,
        quantity: u32,
        snapshot: &CartSnapshot,
    ) -> Result<(), CartError> {
        match self {
            Self::Anonymous(backend) => backend.add(product_id, quantity, snapshot).await,
            Self::Authenticated(backend) => backend.add(product_id, quantity, snapshot).await,
        }
    }

    async fn set_quantity(&self, line_id: LineId, quantity: u32) -> Result<(), CartError> {
        match self {
            Self::Anonymous(backend) => backend.set_quantity(line_id, quantity).await,
            Self::Authenticated(backend) => backend.set_quantity(line_id, quantity).await,
        }
    }

    async fn remove(&self, line_id: LineId) -> Result<(), CartError> {
        match self {
            Self::Anonymous(backend) => backend.remove(line_id).await,
            Self::Authenticated(backend) => backend.remove(line_id).await,
        }
    }

    async fn clear(&self) -> Result<(), CartError> {
        match self {
            Self::Anonymous(backend) => backend.clear().await,
            Self::Authenticated(backend) => backend.clear().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use dokan_core::UserId;

    use super::*;
    use crate::cart::memory::{MemoryCartStore, MemoryCatalog, MemorySlot};

    #[test]
    fn test_no_identity_selects_anonymous() {
        let catalog = MemoryCatalog::new();
        let remote = MemoryCartStore::new(catalog.clone());
        let slot = MemorySlot::new();

        let backend = select_backend(None, &catalog, &remote, &slot);
        assert!(matches!(backend, ActiveBackend::Anonymous(_)));
        assert_eq!(backend.owner(), CartOwner::Anonymous);
    }

    #[test]
    fn test_identity_selects_authenticated() {
        let catalog = MemoryCatalog::new();
        let remote = MemoryCartStore::new(catalog.clone());
        let slot = MemorySlot::new();
        let user = UserId::random();

        let identity = Identity::new(user, SecretString::from("token"));
        let backend = select_backend(Some(identity), &catalog, &remote, &slot);
        assert!(matches!(backend, ActiveBackend::Authenticated(_)));
        assert_eq!(backend.owner(), CartOwner::Authenticated(user));
    }
}
