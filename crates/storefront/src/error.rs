//! Route-level errors and Sentry context.
//!
//! Handlers return [`Result`]; backend and session failures are reported to
//! Sentry and answered with a generic message, coupon problems are shown to
//! the visitor as-is.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::backend::BackendError;
use crate::cart::{CartError, CouponError};
use crate::models::CurrentUser;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A cart operation failed against its backend.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A direct hosted backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// A coupon cannot be applied.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    /// Failures on our side or the backend's, as opposed to the visitor's.
    const fn is_server_error(&self) -> bool {
        matches!(self, Self::Cart(_) | Self::Backend(_) | Self::Session(_))
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Cart(_) | Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::Coupon(CouponError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Coupon(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Response body text. Server-side details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Session(_) => "Internal server error".to_string(),
            Self::Cart(_) | Self::Backend(_) => {
                "Cart service unavailable, please try again".to_string()
            }
            Self::Coupon(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Request error");
        }

        (self.status(), self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Attach the signed-in user to Sentry events from this scope.
pub fn set_sentry_user(user: &CurrentUser) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            email: user.email.clone(),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

/// Record a cart action as a Sentry breadcrumb.
pub fn cart_breadcrumb(message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some("cart".to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    breadcrumb.data.extend(
        data.iter()
            .map(|(key, value)| ((*key).to_string(), serde_json::Value::from(value.as_str()))),
    );

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[tokio::test]
    async fn test_backend_failure_body_is_generic() {
        let err = AppError::Backend(BackendError::RateLimited(5));
        assert!(err.is_server_error());

        let body = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Cart service unavailable, please try again");
    }

    #[test]
    fn test_coupon_errors_are_not_server_errors() {
        assert!(!AppError::Coupon(CouponError::Expired).is_server_error());
        assert_eq!(
            AppError::Coupon(CouponError::Expired).public_message(),
            "Coupon has expired"
        );
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Backend(BackendError::RateLimited(5));
        assert!(err.to_string().starts_with("Backend error: "));

        let err = AppError::Coupon(CouponError::Expired);
        assert_eq!(err.to_string(), "Coupon has expired");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Cart(CartError::Backend(BackendError::RateLimited(5)))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Coupon(CouponError::NotFound("X".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Coupon(CouponError::MinimumNotMet {
                minimum: Decimal::new(500, 0)
            })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
