//! Host-facing station management.

use std::sync::Arc;

use app_core::error::AppError;
use async_trait::async_trait;

use crate::domain::station::Station;
use crate::outbound::store::{MarketStore, NewStation};

const NOT_FOUND_MSG: &str = "Station not found";
const NOT_OWNER_MSG: &str = "You do not own this station";

#[derive(Debug, Clone)]
pub struct CreateStationInput {
    pub user_id: i64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub price_per_kwh: f64,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateStationInput {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: Option<String>,
    pub price_per_kwh: Option<f64>,
    pub available: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StationUseCase: Send + Sync {
    async fn create(&self, input: CreateStationInput) -> Result<Station, AppError>;
    async fn list(&self, user_id: i64) -> Result<Vec<Station>, AppError>;
    /// Available stations ordered by distance from the driver's position.
    async fn nearby(&self, lat: f64, lng: f64) -> Result<Vec<Station>, AppError>;
    async fn update(
        &self,
        user_id: i64,
        station_id: i64,
        input: UpdateStationInput,
    ) -> Result<Station, AppError>;
    async fn delete(&self, user_id: i64, station_id: i64) -> Result<(), AppError>;
}

pub struct StationService {
    store: Arc<dyn MarketStore>,
}

impl StationService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    async fn owned_station(&self, user_id: i64, station_id: i64) -> Result<Station, AppError> {
        let station = self
            .store
            .station(station_id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND_MSG.to_string()))?;
        if station.user_id != user_id {
            return Err(AppError::Forbidden(NOT_OWNER_MSG.to_string()));
        }
        Ok(station)
    }
}

#[async_trait]
impl StationUseCase for StationService {
    async fn create(&self, input: CreateStationInput) -> Result<Station, AppError> {
        self.store
            .create_station(NewStation {
                user_id: input.user_id,
                name: input.name,
                lat: input.lat,
                lng: input.lng,
                address: input.address,
                price_per_kwh: input.price_per_kwh,
            })
            .await
    }

    async fn list(&self, user_id: i64) -> Result<Vec<Station>, AppError> {
        self.store.stations_by_host(user_id).await
    }

    async fn nearby(&self, lat: f64, lng: f64) -> Result<Vec<Station>, AppError> {
        let mut stations = self.store.available_stations().await?;
        stations.sort_by(|a, b| a.distance_km(lat, lng).total_cmp(&b.distance_km(lat, lng)));
        Ok(stations)
    }

    async fn update(
        &self,
        user_id: i64,
        station_id: i64,
        input: UpdateStationInput,
    ) -> Result<Station, AppError> {
        let mut station = self.owned_station(user_id, station_id).await?;

        if let Some(name) = input.name {
            station.name = name;
        }
        if let Some(lat) = input.lat {
            station.lat = lat;
        }
        if let Some(lng) = input.lng {
            station.lng = lng;
        }
        if let Some(address) = input.address {
            station.address = address;
        }
        if let Some(price_per_kwh) = input.price_per_kwh {
            station.price_per_kwh = price_per_kwh;
        }
        if let Some(available) = input.available {
            station.available = available;
        }

        self.store.update_station(station).await
    }

    async fn delete(&self, user_id: i64, station_id: i64) -> Result<(), AppError> {
        self.owned_station(user_id, station_id).await?;
        self.store.delete_station(station_id).await
    }
}
