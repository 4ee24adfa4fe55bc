//! Domain errors - error types for the domain layer

use rust_decimal::Decimal;
use thiserror::Error;

use crate::entities::CouponRejection;
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(Snowflake),

    #[error("Product not found or unavailable: {0}")]
    ProductNotFound(Snowflake),

    #[error("Payment intent not found: {0}")]
    PaymentIntentNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Order total must be greater than zero")]
    ZeroAmount,

    #[error("Coupon is not active")]
    CouponInactive,

    #[error("Coupon has expired")]
    CouponExpired,

    #[error("Coupon usage limit has been reached")]
    CouponUsageLimitReached,

    #[error("Order subtotal must be at least {minimum} to use this coupon")]
    CouponMinimumNotMet { minimum: Decimal },

    #[error("Invalid coupon configuration: {0}")]
    InvalidCouponState(String),

    // =========================================================================
    // Authentication Errors
    // =========================================================================
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Refresh token is invalid or no longer active")]
    InvalidRefreshToken,

    #[error("Payment has not been completed")]
    PaymentNotSettled,

    #[error("Paid amount does not cover the order total")]
    PaymentAmountMismatch,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Administrator role required")]
    AdminRequired,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Username already in use")]
    UsernameAlreadyExists,

    #[error("Phone number already in use")]
    PhoneAlreadyExists,

    #[error("Coupon code already exists")]
    CouponCodeExists,

    #[error("Payment has already been used for another order")]
    PaymentAlreadyUsed,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Payment provider error: {0}")]
    PaymentGatewayError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::CouponNotFound(_) => "UNKNOWN_COUPON",
            Self::OrderNotFound(_) => "UNKNOWN_ORDER",
            Self::ProductNotFound(_) => "UNKNOWN_PRODUCT",
            Self::PaymentIntentNotFound(_) => "UNKNOWN_PAYMENT_INTENT",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::EmptyCart => "EMPTY_CART",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::CouponInactive => "COUPON_INACTIVE",
            Self::CouponExpired => "COUPON_EXPIRED",
            Self::CouponUsageLimitReached => "COUPON_USAGE_LIMIT_REACHED",
            Self::CouponMinimumNotMet { .. } => "COUPON_MINIMUM_NOT_MET",
            Self::InvalidCouponState(_) => "INVALID_COUPON_STATE",

            // Authentication
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::PaymentNotSettled => "PAYMENT_NOT_SETTLED",
            Self::PaymentAmountMismatch => "PAYMENT_AMOUNT_MISMATCH",

            // Authorization
            Self::AdminRequired => "ADMIN_REQUIRED",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::PhoneAlreadyExists => "PHONE_ALREADY_EXISTS",
            Self::CouponCodeExists => "COUPON_CODE_EXISTS",
            Self::PaymentAlreadyUsed => "PAYMENT_ALREADY_USED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::PaymentGatewayError(_) => "PAYMENT_PROVIDER_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::CouponNotFound(_)
                | Self::OrderNotFound(_)
                | Self::ProductNotFound(_)
                | Self::PaymentIntentNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::WeakPassword(_)
                | Self::EmptyCart
                | Self::ZeroAmount
                | Self::CouponInactive
                | Self::CouponExpired
                | Self::CouponUsageLimitReached
                | Self::CouponMinimumNotMet { .. }
                | Self::InvalidCouponState(_)
        )
    }

    /// Check if this error should be reported as 401
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::InvalidRefreshToken
                | Self::PaymentNotSettled
                | Self::PaymentAmountMismatch
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::AdminRequired)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists
                | Self::UsernameAlreadyExists
                | Self::PhoneAlreadyExists
                | Self::CouponCodeExists
                | Self::PaymentAlreadyUsed
        )
    }

    /// Check if this came from the payment provider
    pub fn is_external(&self) -> bool {
        matches!(self, Self::PaymentGatewayError(_))
    }

    /// Check if this is one of the coupon validation failures
    pub fn is_coupon_rejection(&self) -> bool {
        matches!(
            self,
            Self::CouponNotFound(_)
                | Self::CouponInactive
                | Self::CouponExpired
                | Self::CouponUsageLimitReached
                | Self::CouponMinimumNotMet { .. }
                | Self::InvalidCouponState(_)
        )
    }
}

impl From<CouponRejection> for DomainError {
    fn from(rejection: CouponRejection) -> Self {
        match rejection {
            CouponRejection::Inactive => Self::CouponInactive,
            CouponRejection::Expired => Self::CouponExpired,
            CouponRejection::UsageLimitReached => Self::CouponUsageLimitReached,
            CouponRejection::MinimumNotMet { minimum } => Self::CouponMinimumNotMet { minimum },
            CouponRejection::Misconfigured(reason) => Self::InvalidCouponState(reason),
        }
    }
}
