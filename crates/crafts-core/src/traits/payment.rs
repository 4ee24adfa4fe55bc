//! Payment gateway port
//!
//! The provider is untrusted: everything here is data reported by it and is
//! re-checked by checkout before an order is written.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::repositories::RepoResult;

/// Metadata key carrying the buyer's user ID
pub const METADATA_USER_ID: &str = "userId";
/// Metadata key carrying the coupon code quoted at intent creation
pub const METADATA_COUPON_CODE: &str = "couponCode";
/// Metadata key carrying the discount quoted at intent creation
pub const METADATA_DISCOUNT_AMOUNT: &str = "discountAmount";

/// Settlement status as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(untagged)]
    Other(String),
}

impl PaymentStatus {
    #[inline]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Other(other) => other,
        };
        f.write_str(s)
    }
}

/// Request to open a new payment intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    /// Amount in minor units (cents)
    pub amount: i64,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

impl PaymentIntentRequest {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            metadata: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A payment intent as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    /// Amount in minor units (cents)
    pub amount: i64,
    /// Amount actually collected, in minor units
    pub amount_received: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    /// The buyer recorded at intent creation, if any
    pub fn user_id(&self) -> Option<&str> {
        self.metadata.get(METADATA_USER_ID).map(String::as_str)
    }

    /// The coupon code quoted at intent creation, if any
    pub fn coupon_code(&self) -> Option<&str> {
        self.metadata.get(METADATA_COUPON_CODE).map(String::as_str)
    }

    /// The discount the payment amount was quoted with, when it was quoted
    /// for `code`. Unparseable or negative values count as absent.
    pub fn quoted_discount_for(&self, code: &str) -> Option<Decimal> {
        let quoted_code = self.coupon_code()?;
        if !quoted_code.eq_ignore_ascii_case(code.trim()) {
            return None;
        }
        self.metadata
            .get(METADATA_DISCOUNT_AMOUNT)?
            .parse::<Decimal>()
            .ok()
            .filter(|amount| *amount >= Decimal::ZERO)
    }

    /// True when the intent carries no user or carries exactly `user_id`
    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id().is_none_or(|owner| owner == user_id)
    }

    /// The larger of the requested and received amounts, in minor units
    pub fn settled_amount(&self) -> i64 {
        self.amount_received.max(self.amount)
    }
}

/// External payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a new intent for the given amount
    async fn create_intent(&self, request: PaymentIntentRequest) -> RepoResult<PaymentIntent>;

    /// Fetch the current state of an intent
    async fn retrieve_intent(&self, intent_id: &str) -> RepoResult<PaymentIntent>;
}

/// Convert a two-decimal amount to minor units, rounding half away from zero
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Convert minor units back to a two-decimal amount
pub fn from_minor_units(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}
