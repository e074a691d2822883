//! Identity sources.
//!
//! The cart asks for the current identity on every operation, so a sign-in
//! between two calls redirects the second one to the remote store.

use std::future::Future;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::RwLock;

use dokan_core::UserId;

/// An authenticated visitor.
#[derive(Debug, Clone)]
pub struct Identity {
    user_id: UserId,
    access_token: SecretString,
}

impl Identity {
    #[must_use]
    pub const fn new(user_id: UserId, access_token: SecretString) -> Self {
        Self {
            user_id,
            access_token,
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Bearer token forwarded to the remote cart store.
    #[must_use]
    pub const fn access_token(&self) -> &SecretString {
        &self.access_token
    }
}

/// Answers "who is the current visitor, if anyone".
pub trait IdentitySource: Send + Sync {
    fn current(&self) -> impl Future<Output = Option<Identity>> + Send;
}

/// A fixed identity (or none), e.g. for operator tooling.
impl IdentitySource for Option<Identity> {
    async fn current(&self) -> Option<Identity> {
        self.clone()
    }
}

/// An identity that can change while the cart is in use.
///
/// Clones share state, so one handle can sign in while the cart holds
/// another.
#[derive(Debug, Clone, Default)]
pub struct SharedIdentity {
    inner: Arc<RwLock<Option<Identity>>>,
}

impl SharedIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, identity: Identity) {
        *self.inner.write().await = Some(identity);
    }

    pub async fn sign_out(&self) {
        *self.inner.write().await = None;
    }
}

impl IdentitySource for SharedIdentity {
    async fn current(&self) -> Option<Identity> {
        self.inner.read().await.clone()
    }
}
