use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::station::Station;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStationRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
    #[validate(length(min = 1, max = 200))]
    pub address: String,
    #[validate(range(min = 0.0))]
    pub price_per_kwh: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStationRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
    #[validate(length(min = 1, max = 200))]
    pub address: Option<String>,
    #[validate(range(min = 0.0))]
    pub price_per_kwh: Option<f64>,
    pub available: Option<bool>,
}

/// Driver position for the station search. Both coordinates are
/// mandatory; a missing or non-numeric value rejects the request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NearbyStationsQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationResponse {
    pub station_id: i64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub price_per_kwh: f64,
    pub available: bool,
}

impl From<Station> for StationResponse {
    fn from(station: Station) -> Self {
        Self {
            station_id: station.id,
            name: station.name,
            lat: station.lat,
            lng: station.lng,
            address: station.address,
            price_per_kwh: station.price_per_kwh,
            available: station.available,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<StationResponse>,
}

/// Station entry in the driver-facing search, keyed by `id`.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyStationResponse {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub price_per_kwh: f64,
}

impl From<Station> for NearbyStationResponse {
    fn from(station: Station) -> Self {
        Self {
            id: station.id,
            name: station.name,
            lat: station.lat,
            lng: station.lng,
            address: station.address,
            price_per_kwh: station.price_per_kwh,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyStationsResponse {
    pub stations: Vec<NearbyStationResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeolocationResponse {
    pub lat: f64,
    pub lng: f64,
}
