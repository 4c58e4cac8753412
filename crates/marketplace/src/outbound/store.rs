//! The persistence port for marketplace records.

use app_core::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::booking::Booking;
use crate::domain::payment::Payment;
use crate::domain::review::Review;
use crate::domain::station::Station;

#[derive(Debug, Clone)]
pub struct NewStation {
    pub user_id: i64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub price_per_kwh: f64,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub station_id: i64,
    pub user_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub booking_id: i64,
    pub station_id: i64,
    pub user_id: i64,
    pub rating: u8,
    pub review: String,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub booking_id: i64,
    pub amount: i64,
    pub currency: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MarketStore: Send + Sync {
    async fn create_station(&self, station: NewStation) -> Result<Station, AppError>;
    async fn station(&self, id: i64) -> Result<Option<Station>, AppError>;
    async fn stations_by_host(&self, user_id: i64) -> Result<Vec<Station>, AppError>;
    /// Stations currently open for booking, for the driver-facing search.
    async fn available_stations(&self) -> Result<Vec<Station>, AppError>;
    async fn update_station(&self, station: Station) -> Result<Station, AppError>;
    async fn delete_station(&self, id: i64) -> Result<(), AppError>;

    /// Creates the booking, rejecting any overlap with a live booking at
    /// the same station. The check and the insert are atomic.
    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, AppError>;
    async fn booking(&self, id: i64) -> Result<Option<Booking>, AppError>;
    async fn bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, AppError>;
    async fn bookings_for_station_on(
        &self,
        station_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Booking>, AppError>;

    async fn create_review(&self, review: NewReview) -> Result<Review, AppError>;
    async fn review(&self, id: i64) -> Result<Option<Review>, AppError>;
    async fn update_review(&self, review: Review) -> Result<Review, AppError>;
    async fn delete_review(&self, id: i64) -> Result<(), AppError>;
    async fn reviews_for_station(&self, station_id: i64) -> Result<Vec<Review>, AppError>;
    async fn reviews_by_user(&self, user_id: i64) -> Result<Vec<Review>, AppError>;

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, AppError>;
    async fn payments_for_user(&self, user_id: i64) -> Result<Vec<Payment>, AppError>;
}
