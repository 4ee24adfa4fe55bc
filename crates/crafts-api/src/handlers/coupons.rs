//! Coupon handlers
//!
//! The featured listing is public; everything else requires an admin.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use crafts_service::{
    CouponAdminService, CouponListQuery, CouponResponse, CreateCouponRequest, PaginatedResponse,
    UpdateCouponRequest,
};

use crate::extractors::{AdminUser, Pagination, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

/// Active featured coupons
///
/// GET /coupons/featured
pub async fn featured(
    State(state): State<AppState>,
    Pagination(page): Pagination,
) -> ApiResult<Json<PaginatedResponse<CouponResponse>>> {
    let service = CouponAdminService::new(state.service_context());
    let response = service.featured(page).await?;
    Ok(Json(response))
}

/// GET /coupons
pub async fn list_coupons(
    State(state): State<AppState>,
    _admin: AdminUser,
    Pagination(page): Pagination,
    query: Result<Query<CouponListQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<PaginatedResponse<CouponResponse>>> {
    let Query(query) = query.map_err(|e| ApiError::invalid_request(e.body_text()))?;

    let service = CouponAdminService::new(state.service_context());
    let response = service.list_coupons(query, page).await?;
    Ok(Json(response))
}

/// POST /coupons
pub async fn create_coupon(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidatedJson(request): ValidatedJson<CreateCouponRequest>,
) -> ApiResult<Created<Json<CouponResponse>>> {
    tracing::info!(admin_id = %admin.user_id, code = %request.code, "Creating coupon");
    let service = CouponAdminService::new(state.service_context());
    let response = service.create_coupon(request).await?;
    Ok(Created(Json(response)))
}

/// GET /coupons/{code}
pub async fn get_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(code): Path<String>,
) -> ApiResult<Json<CouponResponse>> {
    let service = CouponAdminService::new(state.service_context());
    let response = service.get_coupon(&code).await?;
    Ok(Json(response))
}

/// PATCH /coupons/{code}
pub async fn update_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(code): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateCouponRequest>,
) -> ApiResult<Json<CouponResponse>> {
    let service = CouponAdminService::new(state.service_context());
    let response = service.update_coupon(&code, request).await?;
    Ok(Json(response))
}

/// Deactivate a coupon; it stays referenced by past orders
///
/// DELETE /coupons/{code}
pub async fn deactivate_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(code): Path<String>,
) -> ApiResult<NoContent> {
    let service = CouponAdminService::new(state.service_context());
    service.deactivate_coupon(&code).await?;
    Ok(NoContent)
}
