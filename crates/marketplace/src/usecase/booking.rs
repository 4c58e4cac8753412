//! Booking creation and hour-granular availability.

use std::sync::Arc;

use app_core::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::domain::booking::Booking;
use crate::outbound::store::{MarketStore, NewBooking};

#[derive(Debug, Clone)]
pub struct CreateBookingInput {
    pub station_id: i64,
    pub user_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingUseCase: Send + Sync {
    async fn create(&self, input: CreateBookingInput) -> Result<Booking, AppError>;

    /// Free one-hour slots ("HH:00-HH:00") at the station on the given
    /// day, in UTC.
    async fn availability(&self, station_id: i64, date: NaiveDate)
        -> Result<Vec<String>, AppError>;
}

pub struct BookingService {
    store: Arc<dyn MarketStore>,
}

impl BookingService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BookingUseCase for BookingService {
    async fn create(&self, input: CreateBookingInput) -> Result<Booking, AppError> {
        if input.end_time <= input.start_time {
            return Err(AppError::RequestFormat(
                "end_time must be after start_time".to_string(),
            ));
        }

        self.store
            .create_booking(NewBooking {
                station_id: input.station_id,
                user_id: input.user_id,
                start_time: input.start_time,
                end_time: input.end_time,
            })
            .await
    }

    async fn availability(
        &self,
        station_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<String>, AppError> {
        let bookings = self.store.bookings_for_station_on(station_id, date).await?;

        let mut slots = Vec::new();
        for hour in 0..24u32 {
            let start = Utc.from_utc_datetime(
                &date
                    .and_hms_opt(hour, 0, 0)
                    .ok_or(AppError::Internal)?,
            );
            let end = start + chrono::Duration::hours(1);

            if bookings.iter().all(|b| !b.overlaps(start, end)) {
                slots.push(format!("{hour:02}:00-{:02}:00", hour + 1));
            }
        }

        Ok(slots)
    }
}
