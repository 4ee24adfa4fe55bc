//! Coupon entity - discount codes applied at checkout

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// How a coupon's value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `value` is a percentage of the subtotal (0-100)
    Percentage,
    /// `value` is a flat amount off the subtotal
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            other => Err(DomainError::InvalidCouponState(format!(
                "unknown discount type '{other}'"
            ))),
        }
    }
}

/// Why a coupon cannot be applied to an order
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponRejection {
    #[error("Coupon is not active")]
    Inactive,

    #[error("Coupon has expired")]
    Expired,

    #[error("Coupon usage limit has been reached")]
    UsageLimitReached,

    #[error("Order subtotal must be at least {minimum} to use this coupon")]
    MinimumNotMet { minimum: Decimal },

    #[error("Coupon is misconfigured: {0}")]
    Misconfigured(String),
}

/// Coupon entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    pub id: Snowflake,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub times_used: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Create a new, active, never-used coupon
    pub fn new(
        id: Snowflake,
        code: String,
        discount_type: DiscountType,
        discount_value: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            code,
            discount_type,
            discount_value,
            min_order_amount: None,
            expires_at: None,
            max_uses: None,
            times_used: 0,
            is_active: true,
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_min_order_amount(mut self, amount: Decimal) -> Self {
        self.min_order_amount = Some(amount);
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_max_uses(mut self, max_uses: i32) -> Self {
        self.max_uses = Some(max_uses);
        self
    }

    /// Codes are compared case-insensitively everywhere
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_lowercase()
    }

    pub fn matches_code(&self, code: &str) -> bool {
        Self::normalize_code(&self.code) == Self::normalize_code(code)
    }

    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.times_used >= max)
    }

    /// Check the stored configuration is coherent
    pub fn check_configuration(&self) -> Result<(), CouponRejection> {
        if self.discount_value < Decimal::ZERO {
            return Err(CouponRejection::Misconfigured(
                "discount value is negative".to_string(),
            ));
        }
        if self.discount_type == DiscountType::Percentage && self.discount_value > Decimal::ONE_HUNDRED
        {
            return Err(CouponRejection::Misconfigured(
                "percentage discount exceeds 100".to_string(),
            ));
        }
        Ok(())
    }

    /// Check every rule that gates applying this coupon to `subtotal`
    pub fn check_applicable(
        &self,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), CouponRejection> {
        self.check_configuration()?;

        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if self.is_expired_at(now) {
            return Err(CouponRejection::Expired);
        }
        if self.is_exhausted() {
            return Err(CouponRejection::UsageLimitReached);
        }
        if let Some(minimum) = self.min_order_amount {
            if subtotal < minimum {
                return Err(CouponRejection::MinimumNotMet { minimum });
            }
        }
        Ok(())
    }

    /// Discount this coupon grants on `subtotal`, never more than the
    /// subtotal itself and never negative.
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let raw = match self.discount_type {
            DiscountType::Percentage => subtotal * self.discount_value / Decimal::ONE_HUNDRED,
            DiscountType::Fixed => self.discount_value,
        };

        raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .clamp(Decimal::ZERO, subtotal)
    }
}
