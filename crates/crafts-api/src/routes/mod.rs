//! Route definitions
//!
//! API routes are mounted under /api/v1; health routes live at the root.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{auth, coupons, health, payment, profile};
use crate::state::AppState;

/// Create the API router (health routes are separate so they skip rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(payment_routes())
        .merge(profile_routes())
        .merge(coupon_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
}

fn payment_routes() -> Router<AppState> {
    Router::new().route("/payment/create-intent", post(payment::create_intent))
}

/// Checkout and order history
fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/checkout", post(profile::checkout))
        .route("/profile/orders", get(profile::list_orders))
        .route("/profile/orders/:order_id", get(profile::get_order))
}

/// Coupon routes; `/coupons/featured` is registered before `/coupons/:code`
fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/coupons/featured", get(coupons::featured))
        .route(
            "/coupons",
            get(coupons::list_coupons).post(coupons::create_coupon),
        )
        .route(
            "/coupons/:code",
            get(coupons::get_coupon)
                .patch(coupons::update_coupon)
                .delete(coupons::deactivate_coupon),
        )
}
