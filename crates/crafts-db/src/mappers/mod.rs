//! Model to entity mappers
//!
//! Rows whose text columns hold values the domain does not recognise fail the
//! conversion instead of being coerced to a default.

mod coupon;
mod order;
mod product;
mod refresh_token;
mod user;

pub use order::order_with_items;
