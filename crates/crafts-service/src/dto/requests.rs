//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crafts_core::entities::DiscountType;
use crafts_core::traits::CouponFilter;
use crafts_core::Snowflake;

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("non_negative").with_message("must not be negative".into()));
    }
    Ok(())
}

fn coupon_code_chars(code: &str) -> Result<(), ValidationError> {
    if code
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("coupon_code")
            .with_message("Coupon code may only contain letters, digits, '-' and '_'".into()))
    }
}

// ============================================================================
// Auth Requests
// ============================================================================

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,

    #[validate(length(min = 7, max = 20, message = "Phone must be 7-20 characters"))]
    pub phone: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,
}

/// User login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Logout request (optional refresh token to revoke)
#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

// ============================================================================
// Checkout Requests
// ============================================================================

/// One cart line; prices are never taken from the client
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub product_id: Snowflake,

    #[validate(range(min = 1, max = 1000, message = "Quantity must be 1-1000"))]
    pub quantity: i32,
}

/// Create payment intent request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    #[validate(length(min = 1, max = 100, message = "Cart must contain 1-100 items"), nested)]
    pub items: Vec<CartItemRequest>,

    #[validate(length(max = 64, message = "Coupon code is too long"))]
    pub coupon_code: Option<String>,
}

/// Checkout request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 100, message = "Cart must contain 1-100 items"), nested)]
    pub items: Vec<CartItemRequest>,

    /// Payment intent id returned by the create-intent call
    #[validate(length(min = 1, max = 255, message = "Payment reference is required"))]
    pub payment_reference: String,

    #[validate(length(max = 64, message = "Coupon code is too long"))]
    pub coupon_code: Option<String>,
}

// ============================================================================
// Coupon Requests
// ============================================================================

/// Create coupon request (admin)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    #[validate(
        length(min = 3, max = 32, message = "Coupon code must be 3-32 characters"),
        custom(function = "coupon_code_chars")
    )]
    pub code: String,

    pub discount_type: DiscountType,

    #[validate(custom(function = "non_negative"))]
    pub discount_value: Decimal,

    #[validate(custom(function = "non_negative"))]
    pub min_order_amount: Option<Decimal>,

    pub expires_at: Option<DateTime<Utc>>,

    #[validate(range(min = 0, message = "Max uses must not be negative"))]
    pub max_uses: Option<i32>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_featured: bool,
}

fn default_true() -> bool {
    true
}

/// Update coupon request (admin); absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCouponRequest {
    pub is_active: Option<bool>,

    pub is_featured: Option<bool>,

    pub expires_at: Option<DateTime<Utc>>,

    #[validate(range(min = 0, message = "Max uses must not be negative"))]
    pub max_uses: Option<i32>,

    #[validate(custom(function = "non_negative"))]
    pub min_order_amount: Option<Decimal>,
}

/// Query string for the coupon admin list
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CouponListQuery {
    pub active: Option<bool>,
    pub featured: Option<bool>,
}

impl From<CouponListQuery> for CouponFilter {
    fn from(query: CouponListQuery) -> Self {
        Self {
            active: query.active,
            featured: query.featured,
            unexpired_only: false,
        }
    }
}
