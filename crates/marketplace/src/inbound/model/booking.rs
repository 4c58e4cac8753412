use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::booking::{Booking, BookingStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub station_id: i64,
    pub user_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingCreatedResponse {
    pub booking_id: i64,
    pub status: BookingStatus,
}

impl From<Booking> for BookingCreatedResponse {
    fn from(booking: Booking) -> Self {
        Self { booking_id: booking.id, status: booking.status }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableSlotsResponse {
    pub available_slots: Vec<String>,
}
