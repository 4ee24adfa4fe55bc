//! Profile handlers
//!
//! Checkout and the caller's order history.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use crafts_core::Snowflake;
use crafts_service::{
    CheckoutRequest, CheckoutService, OrderResponse, OrderService, PaginatedResponse,
};

use crate::extractors::{AuthUser, Pagination, ValidatedJson};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Turn a settled payment into an order
///
/// POST /profile/checkout
///
/// Answers 201 for a new order and 200 when the payment reference was
/// already turned into this order.
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    let service = CheckoutService::new(state.service_context());
    let outcome = service.checkout(auth.user_id, request).await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.order)))
}

/// Order history, newest first
///
/// GET /profile/orders
pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Pagination(page): Pagination,
) -> ApiResult<Json<PaginatedResponse<OrderResponse>>> {
    let service = OrderService::new(state.service_context());
    let response = service.list(auth.user_id, page).await?;
    Ok(Json(response))
}

/// A single order of the caller
///
/// GET /profile/orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<String>,
) -> ApiResult<Json<OrderResponse>> {
    let order_id: Snowflake = order_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid order_id format"))?;

    let service = OrderService::new(state.service_context());
    let response = service.get(auth.user_id, order_id).await?;
    Ok(Json(response))
}
