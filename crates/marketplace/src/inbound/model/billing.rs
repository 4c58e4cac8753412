use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::inbound::model::review::ReviewResponse;
use crate::usecase::billing::Dashboard;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    pub booking_id: i64,
    #[validate(range(min = 1))]
    pub amount: i64,
    #[validate(length(equal = 3))]
    pub currency: String,
    #[validate(length(min = 1))]
    pub success_url: String,
    #[validate(length(min = 1))]
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardBooking {
    pub booking_id: i64,
    pub station_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
}

impl From<Booking> for DashboardBooking {
    fn from(booking: Booking) -> Self {
        Self {
            booking_id: booking.id,
            station_id: booking.station_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: booking.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardPayment {
    pub payment_id: i64,
    pub booking_id: i64,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
}

impl From<Payment> for DashboardPayment {
    fn from(payment: Payment) -> Self {
        Self {
            payment_id: payment.id,
            booking_id: payment.booking_id,
            amount: payment.amount,
            currency: payment.currency,
            status: payment.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub bookings: Vec<DashboardBooking>,
    pub payments: Vec<DashboardPayment>,
    pub reviews: Vec<ReviewResponse>,
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            bookings: dashboard.bookings.into_iter().map(Into::into).collect(),
            payments: dashboard.payments.into_iter().map(Into::into).collect(),
            reviews: dashboard.reviews.into_iter().map(Into::into).collect(),
        }
    }
}
