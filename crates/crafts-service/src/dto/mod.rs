//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs
//!
//! JSON field names are camelCase throughout.

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    CartItemRequest, CheckoutRequest, CouponListQuery, CreateCouponRequest,
    CreatePaymentIntentRequest, LoginRequest, LogoutRequest, RefreshTokenRequest,
    RegisterRequest, UpdateCouponRequest,
};

pub use responses::{
    AuthResponse, CouponResponse, HealthResponse, OrderItemResponse, OrderResponse,
    PaginatedResponse, PaymentIntentResponse, ReadinessResponse, UserResponse,
};
