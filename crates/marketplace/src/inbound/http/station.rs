use app_core::error::AppError;
use app_core::extractors::{AppJson, AppPath, AppQuery};
use app_core::middleware::AuthUser;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::inbound::model::station::{
    CreateStationRequest, GeolocationResponse, NearbyStationsQuery, NearbyStationsResponse,
    StationResponse, StationsResponse, UpdateStationRequest,
};
use crate::inbound::state::MarketState;
use crate::usecase::station::{CreateStationInput, UpdateStationInput};

// Served until clients report device positions; downtown San Francisco.
const DEFAULT_LOCATION: GeolocationResponse = GeolocationResponse { lat: 37.7749, lng: -122.4194 };

pub async fn create_station(
    State(state): State<MarketState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<CreateStationRequest>,
) -> Result<(StatusCode, Json<StationResponse>), AppError> {
    payload.validate()?;

    let station = state
        .station
        .create(CreateStationInput {
            user_id,
            name: payload.name,
            lat: payload.lat,
            lng: payload.lng,
            address: payload.address,
            price_per_kwh: payload.price_per_kwh.unwrap_or(0.0),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(StationResponse::from(station))))
}

pub async fn list_stations(
    State(state): State<MarketState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StationsResponse>, AppError> {
    let stations = state.station.list(user_id).await?;
    Ok(Json(StationsResponse { stations: stations.into_iter().map(Into::into).collect() }))
}

pub async fn update_station(
    State(state): State<MarketState>,
    AuthUser(user_id): AuthUser,
    AppPath(station_id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateStationRequest>,
) -> Result<Json<StationResponse>, AppError> {
    payload.validate()?;

    let station = state
        .station
        .update(
            user_id,
            station_id,
            UpdateStationInput {
                name: payload.name,
                lat: payload.lat,
                lng: payload.lng,
                address: payload.address,
                price_per_kwh: payload.price_per_kwh,
                available: payload.available,
            },
        )
        .await?;

    Ok(Json(StationResponse::from(station)))
}

pub async fn delete_station(
    State(state): State<MarketState>,
    AuthUser(user_id): AuthUser,
    AppPath(station_id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    state.station.delete(user_id, station_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Driver-facing search: available stations sorted by distance from the
/// given position.
pub async fn nearby_stations(
    State(state): State<MarketState>,
    AppQuery(query): AppQuery<NearbyStationsQuery>,
) -> Result<Json<NearbyStationsResponse>, AppError> {
    query.validate()?;

    let stations = state.station.nearby(query.lat, query.lng).await?;
    Ok(Json(NearbyStationsResponse {
        stations: stations.into_iter().map(Into::into).collect(),
    }))
}

pub async fn geolocation(_user: AuthUser) -> Json<GeolocationResponse> {
    Json(DEFAULT_LOCATION.clone())
}
