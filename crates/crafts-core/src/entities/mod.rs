//! Domain entities - core business objects

mod coupon;
mod order;
mod product;
mod refresh_token;
mod user;

pub use coupon::{Coupon, CouponRejection, DiscountType};
pub use order::{NewOrderItem, Order, OrderItem, OrderStatus};
pub use product::Product;
pub use refresh_token::RefreshToken;
pub use user::{Role, User};
