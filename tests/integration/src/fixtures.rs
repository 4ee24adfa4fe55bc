//! Test fixtures and data generators
//!
//! Provides reusable request and response shapes for integration tests.
//! Data persists between runs, so anything unique carries a random suffix.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Get a unique suffix for test data
pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Ten digit phone number unique enough for a test run
fn unique_phone() -> String {
    let n = Uuid::new_v4().as_u128() % 10_000_000_000;
    format!("555{n:010}")
}

// ============================================================================
// Auth
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub phone: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            email: format!("maker{suffix}@example.com"),
            username: format!("maker{suffix}"),
            phone: unique_phone(),
            password: "TestPass123!".to_string(),
            first_name: "Test".to_string(),
            last_name: "Maker".to_string(),
        }
    }
}

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_register(reg: &RegisterRequest) -> Self {
        Self {
            email: reg.email.clone(),
            password: reg.password.clone(),
        }
    }
}

/// Refresh token request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Logout request for a single session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Auth response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub user: UserResponse,
}

/// User response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: String,
}

// ============================================================================
// Checkout
// ============================================================================

/// One cart line
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i32,
}

impl CartItem {
    pub fn new(product_id: impl ToString, quantity: i32) -> Self {
        Self {
            product_id: product_id.to_string(),
            quantity,
        }
    }
}

/// Create payment intent request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    pub items: Vec<CartItem>,
    pub coupon_code: Option<String>,
}

/// Payment intent response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub payment_intent_id: String,
    pub client_secret: Option<String>,
    pub subtotal: String,
    pub discount: String,
    pub total: String,
    pub coupon_applied: bool,
}

/// Checkout request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    pub payment_reference: String,
    pub coupon_code: Option<String>,
}

/// Order line response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

/// Order response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    pub subtotal: String,
    pub discount_amount: String,
    pub total_amount: String,
    pub coupon_code: Option<String>,
    pub payment_reference: Option<String>,
    pub items: Vec<OrderItemResponse>,
}

// ============================================================================
// Coupons
// ============================================================================

/// Create coupon request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_type: String,
    pub discount_value: String,
    pub min_order_amount: Option<String>,
    pub max_uses: Option<i32>,
    pub is_featured: bool,
}

impl CreateCouponRequest {
    pub fn percentage(value: &str) -> Self {
        Self {
            code: format!("IT{}", unique_suffix().to_uppercase()),
            discount_type: "percentage".to_string(),
            discount_value: value.to_string(),
            min_order_amount: None,
            max_uses: None,
            is_featured: false,
        }
    }

    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }
}

/// Update coupon request
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCouponRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<i32>,
}

/// Coupon response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponResponse {
    pub id: String,
    pub code: String,
    pub discount_type: String,
    pub discount_value: String,
    pub max_uses: Option<i32>,
    pub times_used: i32,
    pub is_active: bool,
    pub is_featured: bool,
}

/// Paginated list response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub has_more: bool,
}
