//! Product - read-only catalog view used to price carts

use rust_decimal::Decimal;

use crate::value_objects::Snowflake;

/// Catalog product as seen by checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Snowflake,
    pub name: String,
    pub price: Decimal,
    pub is_active: bool,
}

impl Product {
    pub fn new(id: Snowflake, name: String, price: Decimal) -> Self {
        Self {
            id,
            name,
            price,
            is_active: true,
        }
    }

    /// Products that are inactive or priced below zero cannot be sold
    #[inline]
    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.price >= Decimal::ZERO
    }
}
