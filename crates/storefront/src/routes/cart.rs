//! Cart route handlers.
//!
//! Each request builds a [`StorefrontCart`](crate::state::StorefrontCart) bound to the visitor's session:
//! guests read and write the `guest_cart` session slot, signed-in users their
//! rows in the hosted backend. Mutations respond with the refreshed cart and
//! an `HX-Trigger: cart-updated` header so other page fragments can reload.

use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use dokan_core::{LineId, Price, ProductId};

use crate::cart::{
    CartLine, CartMode, CartSnapshot, CartTotals, CouponError, CouponReader, normalize_code,
};
use crate::error::{Result, cart_breadcrumb};
use crate::models::session_keys;
use crate::state::AppState;

const CART_UPDATED: [(&str, &str); 1] = [("HX-Trigger", "cart-updated")];

// =============================================================================
// Views
// =============================================================================

/// One cart line as rendered to clients.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub line_id: LineId,
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub exceeds_stock: bool,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let product = line.product.as_ref();
        Self {
            line_id: line.line_id,
            product_id: line.product_id,
            name: product.map(|p| p.name.clone()).unwrap_or_default(),
            slug: product.map(|p| p.slug.clone()).unwrap_or_default(),
            image: product.and_then(|p| p.primary_image().map(String::from)),
            quantity: line.quantity,
            unit_price: Price::taka(line.unit_price()).display(),
            line_total: Price::taka(line.line_total()).display(),
            exceeds_stock: line.exceeds_stock(),
        }
    }
}

/// The cart as rendered to clients.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub mode: CartMode,
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub subtotal_display: String,
    pub total_display: String,
}

impl CartView {
    fn new(snapshot: &CartSnapshot, totals: CartTotals) -> Self {
        Self {
            mode: snapshot.mode(),
            lines: snapshot.lines.iter().map(CartLineView::from).collect(),
            item_count: snapshot.item_count(),
            subtotal_display: Price::taka(totals.subtotal).display(),
            total_display: Price::taka(totals.total).display(),
            subtotal: totals.subtotal,
            discount: totals.discount,
            total: totals.total,
            coupon_code: totals.coupon_code,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Quantity is signed; zero or less removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: LineId,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: LineId,
}

#[derive(Debug, Deserialize)]
pub struct CouponForm {
    pub code: String,
}

// =============================================================================
// Coupon Helpers
// =============================================================================

/// Totals for `snapshot` with the session's remembered coupon, if it still
/// applies. A coupon that no longer applies is left out silently.
async fn totals_for(state: &AppState, session: &Session, snapshot: &CartSnapshot) -> CartTotals {
    let subtotal = snapshot.subtotal();
    let code = match session.get::<String>(session_keys::COUPON_CODE).await {
        Ok(Some(code)) => code,
        Ok(None) => return CartTotals::without_coupon(subtotal),
        Err(e) => {
            warn!(error = %e, "Failed to read coupon from session");
            return CartTotals::without_coupon(subtotal);
        }
    };

    let coupon = match state.coupons().find_coupon(&code).await {
        Ok(Some(coupon)) => coupon,
        Ok(None) => {
            debug!(code = %code, "Remembered coupon no longer exists");
            return CartTotals::without_coupon(subtotal);
        }
        Err(e) => {
            warn!(error = %e, code = %code, "Failed to look up coupon");
            return CartTotals::without_coupon(subtotal);
        }
    };

    CartTotals::with_coupon(subtotal, &coupon, Utc::now()).unwrap_or_else(|e| {
        debug!(code = %code, reason = %e, "Remembered coupon does not apply");
        CartTotals::without_coupon(subtotal)
    })
}

async fn view(state: &AppState, session: &Session, snapshot: &CartSnapshot) -> CartView {
    let totals = totals_for(state, session, snapshot).await;
    CartView::new(snapshot, totals)
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Json<CartView> {
    let snapshot = state.cart(&session).refresh().await;
    Json(view(&state, &session, &snapshot).await)
}

/// Add a product to the cart.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<impl IntoResponse> {
    let quantity = form.quantity.unwrap_or(1);
    let snapshot = state
        .cart(&session)
        .add_to_cart(form.product_id, quantity)
        .await?;

    cart_breadcrumb(
        "Added to cart",
        &[
            ("product_id", form.product_id.to_string()),
            ("quantity", quantity.to_string()),
        ],
    );

    Ok((
        AppendHeaders(CART_UPDATED),
        Json(view(&state, &session, &snapshot).await),
    ))
}

/// Set a line's quantity.
#[instrument(skip(state, session), fields(line_id = %form.line_id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<impl IntoResponse> {
    let snapshot = state
        .cart(&session)
        .update_quantity(form.line_id, form.quantity)
        .await?;

    Ok((
        AppendHeaders(CART_UPDATED),
        Json(view(&state, &session, &snapshot).await),
    ))
}

/// Remove a line.
#[instrument(skip(state, session), fields(line_id = %form.line_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<impl IntoResponse> {
    let snapshot = state.cart(&session).remove_item(form.line_id).await?;

    Ok((
        AppendHeaders(CART_UPDATED),
        Json(view(&state, &session, &snapshot).await),
    ))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let snapshot = state.cart(&session).clear_cart().await?;

    Ok((
        AppendHeaders(CART_UPDATED),
        Json(view(&state, &session, &snapshot).await),
    ))
}

/// Cart count badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Json<CartCount> {
    let snapshot = state.cart(&session).refresh().await;
    Json(CartCount {
        count: snapshot.item_count(),
    })
}

/// Apply a coupon code to the cart and remember it in the session.
#[instrument(skip(state, session, form))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CouponForm>,
) -> Result<impl IntoResponse> {
    let code = normalize_code(&form.code);
    if code.is_empty() {
        return Err(CouponError::NotFound(code).into());
    }

    let snapshot = state.cart(&session).refresh().await;
    let coupon = state
        .coupons()
        .find_coupon(&code)
        .await?
        .ok_or_else(|| CouponError::NotFound(code.clone()))?;
    let totals = CartTotals::with_coupon(snapshot.subtotal(), &coupon, Utc::now())?;

    session.insert(session_keys::COUPON_CODE, &code).await?;
    cart_breadcrumb("Applied coupon", &[("code", code.clone())]);

    Ok((
        AppendHeaders(CART_UPDATED),
        Json(CartView::new(&snapshot, totals)),
    ))
}

/// Forget the applied coupon.
#[instrument(skip(state, session))]
pub async fn remove_coupon(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    session.remove::<String>(session_keys::COUPON_CODE).await?;
    let snapshot = state.cart(&session).refresh().await;

    Ok((
        AppendHeaders(CART_UPDATED),
        Json(CartView::new(
            &snapshot,
            CartTotals::without_coupon(snapshot.subtotal()),
        )),
    ))
}
