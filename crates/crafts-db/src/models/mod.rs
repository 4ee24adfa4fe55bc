//! Database models - SQLx-compatible structs for PostgreSQL tables

mod coupon;
mod order;
mod product;
mod refresh_token;
mod user;

pub use coupon::CouponModel;
pub use order::{OrderItemModel, OrderModel};
pub use product::ProductModel;
pub use refresh_token::RefreshTokenModel;
pub use user::UserModel;
