//! Signed-in cart rows in the hosted `cart_items` table.

use std::sync::LazyLock;

use serde::Serialize;
use tracing::instrument;

use dokan_core::{CartItemId, ProductId, UserId};

use super::client::{BackendClient, Bearer, Filter};
use super::BackendError;
use crate::cart::{Identity, RemoteCartRow, RemoteCartStore};
use crate::models::PRODUCT_COLUMNS;

const CART_ITEMS_TABLE: &str = "cart_items";

/// Row columns plus the embedded product.
static CART_ITEM_SELECT: LazyLock<String> =
    LazyLock::new(|| format!("id,product_id,quantity,products({PRODUCT_COLUMNS})"));

#[derive(Serialize)]
struct NewCartItem {
    user_id: UserId,
    product_id: ProductId,
    quantity: u32,
}

#[derive(Serialize)]
struct QuantityPatch {
    quantity: u32,
}

/// Remote cart store over `cart_items`.
///
/// Requests carry the user's own access token, and every filter also pins
/// `user_id` so a row ID from another cart matches nothing.
#[derive(Clone)]
pub struct RestCartStore {
    client: BackendClient,
}

impl RestCartStore {
    #[must_use]
    pub const fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

fn owned_by(identity: &Identity) -> Filter {
    Filter::eq("user_id", identity.user_id())
}

impl RemoteCartStore for RestCartStore {
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id()))]
    async fn fetch_rows(&self, identity: &Identity) -> Result<Vec<RemoteCartRow>, BackendError> {
        self.client
            .select(
                CART_ITEMS_TABLE,
                &CART_ITEM_SELECT,
                &[owned_by(identity)],
                Bearer::Token(identity.access_token()),
            )
            .await
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.user_id(), product_id = %product_id))]
    async fn insert_row(
        &self,
        identity: &Identity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let row = NewCartItem {
            user_id: identity.user_id(),
            product_id,
            quantity,
        };
        self.client
            .insert(
                CART_ITEMS_TABLE,
                &row,
                Bearer::Token(identity.access_token()),
            )
            .await
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.user_id(), item_id = %item_id))]
    async fn update_quantity(
        &self,
        identity: &Identity,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        self.client
            .update(
                CART_ITEMS_TABLE,
                &[Filter::eq("id", item_id), owned_by(identity)],
                &QuantityPatch { quantity },
                Bearer::Token(identity.access_token()),
            )
            .await
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.user_id(), item_id = %item_id))]
    async fn delete_row(&self, identity: &Identity, item_id: CartItemId) -> Result<(), BackendError> {
        self.client
            .delete(
                CART_ITEMS_TABLE,
                &[Filter::eq("id", item_id), owned_by(identity)],
                Bearer::Token(identity.access_token()),
            )
            .await
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.user_id()))]
    async fn delete_all(&self, identity: &Identity) -> Result<(), BackendError> {
        self.client
            .delete(
                CART_ITEMS_TABLE,
                &[owned_by(identity)],
                Bearer::Token(identity.access_token()),
            )
            .await
    }
}
