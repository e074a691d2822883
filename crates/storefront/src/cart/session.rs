//! Session-backed guest slot and identity.
//!
//! The visitor's server-side session is the browsing context a guest cart is
//! scoped to.

use tower_sessions::Session;
use tracing::warn;

use super::{CartError, Identity, IdentitySource, LocalSlot, StoredLine};
use crate::models::{CurrentUser, session_keys};

/// The guest cart slot inside a visitor's session.
#[derive(Clone)]
pub struct SessionSlot(Session);

impl SessionSlot {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }
}

impl LocalSlot for SessionSlot {
    async fn load(&self) -> Result<Vec<StoredLine>, CartError> {
        Ok(self
            .0
            .get::<Vec<StoredLine>>(session_keys::GUEST_CART)
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, lines: &[StoredLine]) -> Result<(), CartError> {
        self.0.insert(session_keys::GUEST_CART, lines).await?;
        Ok(())
    }

    async fn erase(&self) -> Result<(), CartError> {
        self.0
            .remove::<Vec<StoredLine>>(session_keys::GUEST_CART)
            .await?;
        Ok(())
    }
}

/// The signed-in user recorded in a visitor's session, if any.
#[derive(Clone)]
pub struct SessionIdentity(Session);

impl SessionIdentity {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }
}

impl IdentitySource for SessionIdentity {
    async fn current(&self) -> Option<Identity> {
        match self.0.get::<CurrentUser>(session_keys::CURRENT_USER).await {
            Ok(user) => user.map(Identity::from),
            Err(e) => {
                warn!(error = %e, "Failed to read current user from session");
                None
            }
        }
    }
}
