use app_core::error::AppError;
use app_core::extractors::AppJson;
use app_core::middleware::AuthUser;
use axum::extract::State;
use axum::Json;
use validator::Validate;

use crate::inbound::model::billing::{CheckoutRequest, CheckoutResponse, DashboardResponse};
use crate::inbound::state::MarketState;
use crate::usecase::billing::CheckoutInput;

pub async fn create_checkout_session(
    State(state): State<MarketState>,
    AppJson(payload): AppJson<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    payload.validate()?;

    let checkout_url = state
        .billing
        .checkout(CheckoutInput {
            booking_id: payload.booking_id,
            amount: payload.amount,
            currency: payload.currency,
            success_url: payload.success_url,
            cancel_url: payload.cancel_url,
        })
        .await?;

    Ok(Json(CheckoutResponse { checkout_url }))
}

pub async fn dashboard(
    State(state): State<MarketState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let dashboard = state.billing.dashboard(user_id).await?;
    Ok(Json(DashboardResponse::from(dashboard)))
}
