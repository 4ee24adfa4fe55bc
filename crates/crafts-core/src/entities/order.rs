//! Order entity - a committed purchase and its line items

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Fulfilment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Processing,
    OnDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::OnDelivery => "on_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the order can move from `self` to `next`
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Processing, Self::OnDelivery | Self::Cancelled)
                | (Self::OnDelivery, Self::Delivered | Self::Cancelled)
        )
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "on_delivery" => Ok(Self::OnDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::ValidationError(format!(
                "Unknown order status: {other}"
            ))),
        }
    }
}

/// A line item as requested by the buyer, before pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: Snowflake,
    pub quantity: i32,
}

/// A priced, immutable line item of a committed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: Snowflake,
    pub order_id: Snowflake,
    pub product_id: Snowflake,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderItem {
    #[inline]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub coupon_code: Option<String>,
    pub payment_reference: Option<String>,
    pub purchased_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Build a new `processing` order. The discount is clamped so the total
    /// can never go negative.
    pub fn new(
        id: Snowflake,
        user_id: Snowflake,
        subtotal: Decimal,
        discount_amount: Decimal,
        coupon_code: Option<String>,
        payment_reference: Option<String>,
        items: Vec<OrderItem>,
    ) -> Self {
        let discount_amount = discount_amount.clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO));
        Self {
            id,
            user_id,
            subtotal,
            discount_amount,
            total_amount: subtotal - discount_amount,
            status: OrderStatus::Processing,
            coupon_code,
            payment_reference,
            purchased_at: Utc::now(),
            items,
        }
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: Snowflake) -> bool {
        self.user_id == user_id
    }

    /// Sum of the captured line totals
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}
