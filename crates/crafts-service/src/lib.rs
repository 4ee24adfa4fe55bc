//! # crafts-service
//!
//! Application layer containing business logic, services, and DTOs.

pub mod dto;
pub mod services;

pub use dto::*;
pub use services::{
    AuthService, CheckoutOutcome, CheckoutService, CouponAdminService, CouponService,
    OrderService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    ServiceSettings,
};
