//! Review lifecycle. A review always hangs off an existing booking and
//! inherits the booking's station.

use std::sync::Arc;

use app_core::error::AppError;
use async_trait::async_trait;

use crate::domain::review::Review;
use crate::outbound::store::{MarketStore, NewReview};

const BOOKING_NOT_FOUND_MSG: &str = "Booking not found";
const REVIEW_NOT_FOUND_MSG: &str = "Review not found";
const NOT_AUTHOR_MSG: &str = "You did not write this review";

#[derive(Debug, Clone)]
pub struct CreateReviewInput {
    pub booking_id: i64,
    pub user_id: i64,
    pub rating: u8,
    pub review: String,
}

#[derive(Debug, Clone)]
pub struct UpdateReviewInput {
    pub review_id: i64,
    pub user_id: i64,
    pub rating: u8,
    pub review: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewUseCase: Send + Sync {
    async fn create(&self, input: CreateReviewInput) -> Result<Review, AppError>;
    async fn get(&self, review_id: i64) -> Result<Review, AppError>;
    async fn update(&self, input: UpdateReviewInput) -> Result<Review, AppError>;
    async fn delete(&self, user_id: i64, review_id: i64) -> Result<(), AppError>;
    async fn for_station(&self, station_id: i64) -> Result<Vec<Review>, AppError>;
}

pub struct ReviewService {
    store: Arc<dyn MarketStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    async fn authored_review(&self, user_id: i64, review_id: i64) -> Result<Review, AppError> {
        let review = self.get(review_id).await?;
        if review.user_id != user_id {
            return Err(AppError::Forbidden(NOT_AUTHOR_MSG.to_string()));
        }
        Ok(review)
    }
}

#[async_trait]
impl ReviewUseCase for ReviewService {
    async fn create(&self, input: CreateReviewInput) -> Result<Review, AppError> {
        let booking = self
            .store
            .booking(input.booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(BOOKING_NOT_FOUND_MSG.to_string()))?;

        self.store
            .create_review(NewReview {
                booking_id: booking.id,
                station_id: booking.station_id,
                user_id: input.user_id,
                rating: input.rating,
                review: input.review,
            })
            .await
    }

    async fn get(&self, review_id: i64) -> Result<Review, AppError> {
        self.store
            .review(review_id)
            .await?
            .ok_or_else(|| AppError::NotFound(REVIEW_NOT_FOUND_MSG.to_string()))
    }

    async fn update(&self, input: UpdateReviewInput) -> Result<Review, AppError> {
        let mut review = self.authored_review(input.user_id, input.review_id).await?;
        review.rating = input.rating;
        review.review = input.review;
        self.store.update_review(review).await
    }

    async fn delete(&self, user_id: i64, review_id: i64) -> Result<(), AppError> {
        self.authored_review(user_id, review_id).await?;
        self.store.delete_review(review_id).await
    }

    async fn for_station(&self, station_id: i64) -> Result<Vec<Review>, AppError> {
        self.store.reviews_for_station(station_id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::outbound::memory::MemoryMarketStore;
    use crate::outbound::store::NewBooking;

    async fn service_with_booking() -> (ReviewService, i64) {
        let store = Arc::new(MemoryMarketStore::new());
        let booking = store
            .create_booking(NewBooking {
                station_id: 5,
                user_id: 1,
                start_time: Utc.with_ymd_and_hms(2025, 8, 10, 10, 0, 0).unwrap(),
                end_time: Utc.with_ymd_and_hms(2025, 8, 10, 12, 0, 0).unwrap(),
            })
            .await
            .unwrap();
        (ReviewService::new(store), booking.id)
    }

    fn create_input(booking_id: i64, user_id: i64) -> CreateReviewInput {
        CreateReviewInput {
            booking_id,
            user_id,
            rating: 5,
            review: "Great experience!".to_string(),
        }
    }

    #[tokio::test]
    async fn review_inherits_the_bookings_station() {
        let (service, booking_id) = service_with_booking().await;
        let review = service.create(create_input(booking_id, 1)).await.unwrap();

        assert_eq!(review.station_id, 5);
        assert_eq!(service.for_station(5).await.unwrap().len(), 1);
        assert!(service.for_station(6).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn review_requires_an_existing_booking() {
        let (service, _) = service_with_booking().await;
        let err = service.create(create_input(999, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn author_can_update_and_delete() {
        let (service, booking_id) = service_with_booking().await;
        let review = service.create(create_input(booking_id, 1)).await.unwrap();

        let updated = service
            .update(UpdateReviewInput {
                review_id: review.id,
                user_id: 1,
                rating: 3,
                review: "Okay.".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(updated.rating, 3);

        service.delete(1, review.id).await.unwrap();
        assert!(matches!(service.get(review.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn only_the_author_may_modify() {
        let (service, booking_id) = service_with_booking().await;
        let review = service.create(create_input(booking_id, 1)).await.unwrap();

        let err = service.delete(2, review.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service
            .update(UpdateReviewInput {
                review_id: review.id,
                user_id: 2,
                rating: 1,
                review: "Bad.".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
