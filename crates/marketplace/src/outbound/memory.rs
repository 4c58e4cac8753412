//! In-memory [`MarketStore`] implementation backed by linear scans over
//! `RwLock`-guarded vectors. The booking overlap check runs under the
//! write lock, so two racing requests cannot both reserve the same slot.

use app_core::error::AppError;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::review::Review;
use crate::domain::station::Station;
use crate::outbound::store::{MarketStore, NewBooking, NewPayment, NewReview, NewStation};

const OVERLAP_MSG: &str = "Booking time overlaps with an existing booking";

#[derive(Default)]
pub struct MemoryMarketStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    stations: Vec<Station>,
    bookings: Vec<Booking>,
    reviews: Vec<Review>,
    payments: Vec<Payment>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MarketStore for MemoryMarketStore {
    async fn create_station(&self, station: NewStation) -> Result<Station, AppError> {
        let mut inner = self.inner.write().await;
        let station = Station {
            id: inner.next_id(),
            user_id: station.user_id,
            name: station.name,
            lat: station.lat,
            lng: station.lng,
            address: station.address,
            price_per_kwh: station.price_per_kwh,
            available: true,
        };
        inner.stations.push(station.clone());
        Ok(station)
    }

    async fn station(&self, id: i64) -> Result<Option<Station>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.stations.iter().find(|s| s.id == id).cloned())
    }

    async fn stations_by_host(&self, user_id: i64) -> Result<Vec<Station>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .stations
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn available_stations(&self) -> Result<Vec<Station>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.stations.iter().filter(|s| s.available).cloned().collect())
    }

    async fn update_station(&self, station: Station) -> Result<Station, AppError> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .stations
            .iter_mut()
            .find(|s| s.id == station.id)
            .ok_or_else(|| AppError::NotFound("Station not found".to_string()))?;
        *slot = station.clone();
        Ok(station)
    }

    async fn delete_station(&self, id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let before = inner.stations.len();
        inner.stations.retain(|s| s.id != id);
        if inner.stations.len() == before {
            return Err(AppError::NotFound("Station not found".to_string()));
        }
        Ok(())
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, AppError> {
        let mut inner = self.inner.write().await;

        let collides = inner
            .bookings
            .iter()
            .filter(|b| b.station_id == booking.station_id)
            .any(|b| b.overlaps(booking.start_time, booking.end_time));
        if collides {
            return Err(AppError::Conflict(OVERLAP_MSG.to_string()));
        }

        let booking = Booking {
            id: inner.next_id(),
            station_id: booking.station_id,
            user_id: booking.user_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: BookingStatus::Confirmed,
        };
        inner.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn booking(&self, id: i64) -> Result<Option<Booking>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn bookings_for_station_on(
        &self,
        station_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Booking>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .bookings
            .iter()
            .filter(|b| {
                b.station_id == station_id
                    && b.status != BookingStatus::Cancelled
                    && b.start_time.date_naive() <= date
                    && b.end_time.date_naive() >= date
            })
            .cloned()
            .collect())
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, AppError> {
        let mut inner = self.inner.write().await;
        let review = Review {
            id: inner.next_id(),
            booking_id: review.booking_id,
            station_id: review.station_id,
            user_id: review.user_id,
            rating: review.rating,
            review: review.review,
        };
        inner.reviews.push(review.clone());
        Ok(review)
    }

    async fn review(&self, id: i64) -> Result<Option<Review>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn update_review(&self, review: Review) -> Result<Review, AppError> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .reviews
            .iter_mut()
            .find(|r| r.id == review.id)
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;
        *slot = review.clone();
        Ok(review)
    }

    async fn delete_review(&self, id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let before = inner.reviews.len();
        inner.reviews.retain(|r| r.id != id);
        if inner.reviews.len() == before {
            return Err(AppError::NotFound("Review not found".to_string()));
        }
        Ok(())
    }

    async fn reviews_for_station(&self, station_id: i64) -> Result<Vec<Review>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .iter()
            .filter(|r| r.station_id == station_id)
            .cloned()
            .collect())
    }

    async fn reviews_by_user(&self, user_id: i64) -> Result<Vec<Review>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, AppError> {
        let mut inner = self.inner.write().await;
        let payment = Payment {
            id: inner.next_id(),
            booking_id: payment.booking_id,
            amount: payment.amount,
            currency: payment.currency,
            status: PaymentStatus::Pending,
        };
        inner.payments.push(payment.clone());
        Ok(payment)
    }

    async fn payments_for_user(&self, user_id: i64) -> Result<Vec<Payment>, AppError> {
        let inner = self.inner.read().await;
        let booking_ids: Vec<i64> = inner
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| b.id)
            .collect();
        Ok(inner
            .payments
            .iter()
            .filter(|p| booking_ids.contains(&p.booking_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn slot(start_hour: u32, end_hour: u32) -> NewBooking {
        NewBooking {
            station_id: 1,
            user_id: 1,
            start_time: Utc.with_ymd_and_hms(2025, 8, 10, start_hour, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 8, 10, end_hour, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn overlapping_booking_is_a_conflict() {
        let store = MemoryMarketStore::new();
        store.create_booking(slot(10, 12)).await.unwrap();

        let err = store.create_booking(slot(11, 13)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(err.to_string().to_lowercase().contains("overlap"));

        // Different station, same slot: fine.
        let other = NewBooking { station_id: 2, ..slot(11, 13) };
        store.create_booking(other).await.unwrap();
    }

    #[tokio::test]
    async fn back_to_back_bookings_are_allowed() {
        let store = MemoryMarketStore::new();
        store.create_booking(slot(10, 12)).await.unwrap();
        store.create_booking(slot(12, 14)).await.unwrap();
    }

    #[tokio::test]
    async fn station_date_filter_catches_multi_day_bookings() {
        let store = MemoryMarketStore::new();
        let overnight = NewBooking {
            station_id: 1,
            user_id: 1,
            start_time: Utc.with_ymd_and_hms(2025, 8, 9, 22, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 8, 10, 2, 0, 0).unwrap(),
        };
        store.create_booking(overnight).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 8, 10).unwrap();
        assert_eq!(store.bookings_for_station_on(1, date).await.unwrap().len(), 1);

        let date = NaiveDate::from_ymd_opt(2025, 8, 11).unwrap();
        assert!(store.bookings_for_station_on(1, date).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn payments_follow_booking_ownership() {
        let store = MemoryMarketStore::new();
        let booking = store.create_booking(slot(10, 12)).await.unwrap();
        store
            .create_payment(NewPayment {
                booking_id: booking.id,
                amount: 2500,
                currency: "usd".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(store.payments_for_user(1).await.unwrap().len(), 1);
        assert!(store.payments_for_user(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn available_stations_excludes_closed_listings() {
        let store = MemoryMarketStore::new();
        let open = store
            .create_station(NewStation {
                user_id: 1,
                name: "Open".to_string(),
                lat: 37.0,
                lng: -122.0,
                address: "1 First St".to_string(),
                price_per_kwh: 0.40,
            })
            .await
            .unwrap();
        let mut closed = store
            .create_station(NewStation {
                user_id: 1,
                name: "Closed".to_string(),
                lat: 38.0,
                lng: -121.0,
                address: "2 Second St".to_string(),
                price_per_kwh: 0.50,
            })
            .await
            .unwrap();
        closed.available = false;
        store.update_station(closed).await.unwrap();

        let stations = store.available_stations().await.unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, open.id);
    }

    #[tokio::test]
    async fn deleting_a_missing_station_is_not_found() {
        let store = MemoryMarketStore::new();
        let err = store.delete_station(99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
