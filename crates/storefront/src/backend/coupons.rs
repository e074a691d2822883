//! Coupon lookup in the hosted `coupons` table.

use tracing::instrument;

use super::client::{BackendClient, Bearer, Filter};
use super::BackendError;
use crate::cart::{Coupon, CouponReader};

const COUPONS_TABLE: &str = "coupons";
const COUPON_COLUMNS: &str = "id,code,discount_type,discount_value,min_order_amount,\
     max_discount_amount,is_active,starts_at,expires_at,usage_limit,used_count";

#[derive(Clone)]
pub struct RestCoupons {
    client: BackendClient,
}

impl RestCoupons {
    #[must_use]
    pub const fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

impl CouponReader for RestCoupons {
    #[instrument(skip(self))]
    async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, BackendError> {
        Ok(self
            .client
            .select::<Coupon>(
                COUPONS_TABLE,
                COUPON_COLUMNS,
                &[Filter::eq("code", code)],
                Bearer::ApiKey,
            )
            .await?
            .into_iter()
            .next())
    }
}
