//! Coupon model -> entity mapper

use crafts_core::entities::Coupon;
use crafts_core::error::DomainError;
use crafts_core::value_objects::Snowflake;

use crate::models::CouponModel;

impl TryFrom<CouponModel> for Coupon {
    type Error = DomainError;

    fn try_from(model: CouponModel) -> Result<Self, Self::Error> {
        Ok(Coupon {
            id: Snowflake::new(model.id),
            discount_type: model.discount_type.parse().map_err(|_| {
                DomainError::InvalidCouponState(format!(
                    "coupon '{}' has unknown discount type '{}'",
                    model.code, model.discount_type
                ))
            })?,
            code: model.code,
            discount_value: model.discount_value,
            min_order_amount: model.min_order_amount,
            expires_at: model.expires_at,
            max_uses: model.max_uses,
            times_used: model.times_used,
            is_active: model.is_active,
            is_featured: model.is_featured,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
