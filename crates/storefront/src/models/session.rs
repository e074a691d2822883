//! Session-related types.
//!
//! Types stored in the session for identity and the guest cart.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use dokan_core::UserId;

use crate::cart::Identity;

/// Session-stored user identity.
///
/// Written by the sign-in flow of the hosted auth provider. The access token
/// is forwarded to the backend so row-level security applies to cart rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Auth provider user ID.
    pub id: UserId,
    /// User's email address, when the provider shares it.
    pub email: Option<String>,
    /// Short-lived access token (JWT) issued by the auth provider.
    pub access_token: String,
}

impl From<CurrentUser> for Identity {
    fn from(user: CurrentUser) -> Self {
        Self::new(user.id, SecretString::from(user.access_token))
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the guest cart line list.
    pub const GUEST_CART: &str = "guest_cart";

    /// Key for the coupon code applied to the cart.
    pub const COUPON_CODE: &str = "coupon_code";
}
