//! Payment handlers

use axum::{extract::State, Json};
use crafts_service::{CheckoutService, CreatePaymentIntentRequest, PaymentIntentResponse};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Quote the cart and open a payment intent
///
/// POST /payment/create-intent
pub async fn create_intent(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreatePaymentIntentRequest>,
) -> ApiResult<Json<PaymentIntentResponse>> {
    let service = CheckoutService::new(state.service_context());
    let response = service.create_payment_intent(auth.user_id, request).await?;
    Ok(Json(response))
}
