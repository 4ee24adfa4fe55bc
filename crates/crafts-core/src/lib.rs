//! # crafts-core
//!
//! Domain layer containing entities, value objects, repository traits, and the
//! payment gateway port. This crate has zero dependencies on infrastructure
//! (database, web framework, HTTP clients).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Coupon, CouponRejection, DiscountType, NewOrderItem, Order, OrderItem, OrderStatus, Product,
    RefreshToken, Role, User,
};
pub use error::DomainError;
pub use traits::{
    from_minor_units, run_pipeline, to_minor_units, CouponFilter, CouponRepository, Create,
    Delete, OrderRepository, Page, PageRequest, PaymentGateway, PaymentIntent,
    PaymentIntentRequest, PaymentStatus, ProductRepository, ReadByKey, ReadPaged,
    RefreshTokenRepository, RepoResult, Update, UserRepository, WritePipeline,
    METADATA_COUPON_CODE, METADATA_DISCOUNT_AMOUNT, METADATA_USER_ID,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
