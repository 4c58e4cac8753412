use app_core::error::AppError;
use app_core::extractors::{AppJson, AppPath, AppQuery};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::inbound::model::booking::{
    AvailabilityQuery, AvailableSlotsResponse, BookingCreatedResponse, CreateBookingRequest,
};
use crate::inbound::state::MarketState;
use crate::usecase::booking::CreateBookingInput;

pub async fn create_booking(
    State(state): State<MarketState>,
    AppJson(payload): AppJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingCreatedResponse>), AppError> {
    let booking = state
        .booking
        .create(CreateBookingInput {
            station_id: payload.station_id,
            user_id: payload.user_id,
            start_time: payload.start_time,
            end_time: payload.end_time,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(BookingCreatedResponse::from(booking))))
}

pub async fn station_availability(
    State(state): State<MarketState>,
    AppPath(station_id): AppPath<i64>,
    AppQuery(query): AppQuery<AvailabilityQuery>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    let available_slots = state.booking.availability(station_id, query.date).await?;
    Ok(Json(AvailableSlotsResponse { available_slots }))
}
