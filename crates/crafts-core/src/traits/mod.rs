//! Ports the domain depends on

mod capabilities;
mod payment;
mod repositories;

pub use capabilities::{run_pipeline, Create, Delete, ReadByKey, ReadPaged, Update, WritePipeline};
pub use payment::{
    from_minor_units, to_minor_units, PaymentGateway, PaymentIntent, PaymentIntentRequest,
    PaymentStatus, METADATA_COUPON_CODE, METADATA_DISCOUNT_AMOUNT, METADATA_USER_ID,
};
pub use repositories::{
    CouponFilter, CouponRepository, OrderRepository, Page, PageRequest, ProductRepository,
    RefreshTokenRepository, RepoResult, UserRepository,
};
