//! Order database models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database model for orders table
#[derive(Debug, Clone, FromRow)]
pub struct OrderModel {
    pub id: i64,
    pub user_id: i64,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub status: String,
    pub coupon_code: Option<String>,
    pub payment_reference: Option<String>,
    pub purchased_at: DateTime<Utc>,
}

/// Database model for order_items table
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemModel {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}
