//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] for the duration of a
//! request and orchestrates repositories, the payment gateway and the auth
//! primitives from `crafts-common`.

pub mod auth;
pub mod checkout;
pub mod context;
pub mod coupon;
pub mod coupon_admin;
pub mod error;
pub mod order;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::AuthService;
pub use checkout::{CheckoutOutcome, CheckoutService};
pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use coupon::{AppliedDiscount, CouponService};
pub use coupon_admin::CouponAdminService;
pub use error::{ServiceError, ServiceResult};
pub use order::OrderService;
