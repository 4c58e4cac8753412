use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::review::Review;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 2000))]
    pub review: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub review_id: i64,
    pub booking_id: i64,
    pub station_id: i64,
    pub rating: u8,
    pub review: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            review_id: review.id,
            booking_id: review.booking_id,
            station_id: review.station_id,
            rating: review.rating,
            review: review.review,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<ReviewResponse>,
}
