//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in crafts-core.

mod coupon;
mod error;
mod order;
mod product;
mod refresh_token;
mod user;

pub use coupon::PgCouponRepository;
pub use order::PgOrderRepository;
pub use product::PgProductRepository;
pub use refresh_token::PgRefreshTokenRepository;
pub use user::PgUserRepository;
