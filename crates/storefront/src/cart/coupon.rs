//! Coupon codes and cart totals.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dokan_core::CouponId;

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Percent off the subtotal.
    Percentage,
    /// Fixed taka amount off the subtotal.
    Fixed,
}

/// A coupon row from the hosted `coupons` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    /// Stored upper-case.
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    /// Cap for percentage discounts.
    #[serde(default)]
    pub max_discount_amount: Option<Decimal>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    #[serde(default)]
    pub used_count: i32,
}

const fn default_active() -> bool {
    true
}

/// Why a coupon cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("Coupon not found: {0}")]
    NotFound(String),

    #[error("Coupon is not active")]
    Inactive,

    #[error("Coupon is not valid yet")]
    NotStarted,

    #[error("Coupon has expired")]
    Expired,

    #[error("Coupon usage limit reached")]
    UsageLimitReached,

    #[error("Minimum order amount of ৳{minimum} not met")]
    MinimumNotMet { minimum: Decimal },
}

/// Canonical form of a user-entered code.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl Coupon {
    /// Check the coupon can be used for an order of `subtotal` at `now`.
    ///
    /// # Errors
    ///
    /// Returns the first failed condition.
    pub fn validate(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<(), CouponError> {
        if !self.is_active {
            return Err(CouponError::Inactive);
        }
        if self.starts_at.is_some_and(|starts| now < starts) {
            return Err(CouponError::NotStarted);
        }
        if self.expires_at.is_some_and(|expires| now >= expires) {
            return Err(CouponError::Expired);
        }
        if self.usage_limit.is_some_and(|limit| self.used_count >= limit) {
            return Err(CouponError::UsageLimitReached);
        }
        if let Some(minimum) = self.min_order_amount
            && subtotal < minimum
        {
            return Err(CouponError::MinimumNotMet { minimum });
        }
        Ok(())
    }

    /// The discount this coupon grants on `subtotal`, never more than the
    /// subtotal itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the coupon does not validate.
    pub fn discount_for(
        &self,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal, CouponError> {
        self.validate(subtotal, now)?;

        let value = self.discount_value.max(Decimal::ZERO);
        let discount = match self.discount_type {
            DiscountType::Percentage => {
                let raw = subtotal * value / Decimal::ONE_HUNDRED;
                self.max_discount_amount.map_or(raw, |cap| raw.min(cap))
            }
            DiscountType::Fixed => value,
        };

        Ok(round_money(discount.min(subtotal).max(Decimal::ZERO)))
    }
}

/// Money summary for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: Option<String>,
}

impl CartTotals {
    #[must_use]
    pub const fn without_coupon(subtotal: Decimal) -> Self {
        Self {
            subtotal,
            discount: Decimal::ZERO,
            total: subtotal,
            coupon_code: None,
        }
    }

    /// Totals with `coupon` applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the coupon does not validate for `subtotal`.
    pub fn with_coupon(
        subtotal: Decimal,
        coupon: &Coupon,
        now: DateTime<Utc>,
    ) -> Result<Self, CouponError> {
        let discount = coupon.discount_for(subtotal, now)?;
        Ok(Self {
            subtotal,
            discount,
            total: subtotal - discount,
            coupon_code: Some(coupon.code.clone()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn coupon(discount_type: DiscountType, value: i64) -> Coupon {
        Coupon {
            id: CouponId::random(),
            code: "EID25".to_string(),
            discount_type,
            discount_value: Decimal::new(value, 0),
            min_order_amount: None,
            max_discount_amount: None,
            is_active: true,
            starts_at: None,
            expires_at: None,
            usage_limit: None,
            used_count: 0,
        }
    }

    fn taka(amount: i64) -> Decimal {
        Decimal::new(amount, 0)
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  eid25 "), "EID25");
    }

    #[test]
    fn test_percentage_discount() {
        let c = coupon(DiscountType::Percentage, 25);
        assert_eq!(c.discount_for(taka(1000), Utc::now()).unwrap(), taka(250));
    }

    #[test]
    fn test_percentage_discount_capped() {
        let mut c = coupon(DiscountType::Percentage, 50);
        c.max_discount_amount = Some(taka(300));
        assert_eq!(c.discount_for(taka(1000), Utc::now()).unwrap(), taka(300));
    }

    #[test]
    fn test_percentage_discount_rounds_to_poisha() {
        let c = coupon(DiscountType::Percentage, 15);
        // 15% of 33.33 = 4.9995
        let discount = c.discount_for(Decimal::new(3333, 2), Utc::now()).unwrap();
        assert_eq!(discount, Decimal::new(500, 2));
    }

    #[test]
    fn test_fixed_discount_never_exceeds_subtotal() {
        let c = coupon(DiscountType::Fixed, 500);
        assert_eq!(c.discount_for(taka(320), Utc::now()).unwrap(), taka(320));
    }

    #[test]
    fn test_minimum_not_met() {
        let mut c = coupon(DiscountType::Fixed, 100);
        c.min_order_amount = Some(taka(1500));
        assert_eq!(
            c.discount_for(taka(1499), Utc::now()),
            Err(CouponError::MinimumNotMet {
                minimum: taka(1500)
            })
        );
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();

        let mut c = coupon(DiscountType::Fixed, 100);
        c.starts_at = Some(now + Duration::hours(1));
        assert_eq!(c.validate(taka(500), now), Err(CouponError::NotStarted));

        let mut c = coupon(DiscountType::Fixed, 100);
        c.expires_at = Some(now);
        assert_eq!(c.validate(taka(500), now), Err(CouponError::Expired));
    }

    #[test]
    fn test_inactive_and_exhausted() {
        let mut c = coupon(DiscountType::Fixed, 100);
        c.is_active = false;
        assert_eq!(c.validate(taka(500), Utc::now()), Err(CouponError::Inactive));

        let mut c = coupon(DiscountType::Fixed, 100);
        c.usage_limit = Some(10);
        c.used_count = 10;
        assert_eq!(
            c.validate(taka(500), Utc::now()),
            Err(CouponError::UsageLimitReached)
        );
    }

    #[test]
    fn test_totals_with_coupon() {
        let c = coupon(DiscountType::Percentage, 10);
        let totals = CartTotals::with_coupon(taka(2000), &c, Utc::now()).unwrap();
        assert_eq!(totals.discount, taka(200));
        assert_eq!(totals.total, taka(1800));
        assert_eq!(totals.coupon_code.as_deref(), Some("EID25"));
    }

    #[test]
    fn test_deserialize_coupon_row() {
        let json = r#"{
            "id": "9e3b8a54-1c2d-4e5f-8a9b-0c1d2e3f4a5b",
            "code": "POHELA10",
            "discount_type": "percentage",
            "discount_value": 10,
            "min_order_amount": 500,
            "expires_at": "2027-04-14T00:00:00Z",
            "usage_limit": null
        }"#;
        let c: Coupon = serde_json::from_str(json).unwrap();
        assert_eq!(c.discount_type, DiscountType::Percentage);
        assert_eq!(c.min_order_amount, Some(taka(500)));
        assert!(c.is_active);
        assert_eq!(c.used_count, 0);
    }
}
