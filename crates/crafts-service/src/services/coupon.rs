//! Coupon validation and discount computation

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, error, instrument, warn};

use crafts_core::entities::Coupon;
use crafts_core::DomainError;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Discount resolved for a cart; `coupon_code` is set only when one applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDiscount {
    pub coupon_code: Option<String>,
    pub amount: Decimal,
}

impl AppliedDiscount {
    pub fn none() -> Self {
        Self {
            coupon_code: None,
            amount: Decimal::ZERO,
        }
    }

    #[inline]
    pub fn is_applied(&self) -> bool {
        self.coupon_code.is_some()
    }
}

/// Coupon service
pub struct CouponService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CouponService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Look up `code` and check it may be applied to `subtotal`
    #[instrument(skip(self))]
    pub async fn validate(&self, code: &str, subtotal: Decimal) -> ServiceResult<Coupon> {
        let code = code.trim();
        if code.is_empty() {
            return Err(DomainError::CouponNotFound(String::new()).into());
        }

        let coupon = self
            .ctx
            .coupon_repo()
            .find_by_code(code)
            .await?
            .ok_or_else(|| DomainError::CouponNotFound(code.to_string()))?;

        coupon
            .check_applicable(subtotal, Utc::now())
            .map_err(DomainError::from)?;

        Ok(coupon)
    }

    /// Discount granted by `coupon` on `subtotal`, clamped to the subtotal
    pub fn compute_discount(coupon: &Coupon, subtotal: Decimal) -> Decimal {
        coupon.discount_for(subtotal)
    }

    /// Resolve an optional coupon code for checkout.
    ///
    /// Any failure yields no discount instead of an error; the reason is
    /// logged so silently dropped coupons stay visible.
    #[instrument(skip(self))]
    pub async fn resolve_discount(&self, code: Option<&str>, subtotal: Decimal) -> AppliedDiscount {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            return AppliedDiscount::none();
        };

        match self.validate(code, subtotal).await {
            Ok(coupon) => AppliedDiscount {
                amount: Self::compute_discount(&coupon, subtotal),
                coupon_code: Some(coupon.code),
            },
            Err(e) => {
                if e.as_domain().is_some_and(DomainError::is_coupon_rejection) {
                    warn!(code, reason = %e, "Coupon rejected, continuing without discount");
                } else {
                    error!(code, error = %e, "Coupon lookup failed, continuing without discount");
                }
                AppliedDiscount::none()
            }
        }
    }

    /// Count one use of `code`. Never fails the caller.
    #[instrument(skip(self))]
    pub async fn increment_usage(&self, code: &str) {
        match self.ctx.coupon_repo().increment_usage(code).await {
            Ok(true) => debug!("Coupon usage recorded"),
            Ok(false) => warn!("Coupon usage not recorded: cap reached or coupon missing"),
            Err(e) => error!(error = %e, "Failed to record coupon usage"),
        }
    }
}
