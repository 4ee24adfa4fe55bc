//! Product database model

use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database model for the columns of products that checkout reads
#[derive(Debug, Clone, FromRow)]
pub struct ProductModel {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub is_active: bool,
}
