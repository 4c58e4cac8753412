use app_core::error::AppError;
use app_core::extractors::{AppJson, AppPath};
use app_core::middleware::AuthUser;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::inbound::model::review::{ReviewRequest, ReviewResponse, ReviewsResponse};
use crate::inbound::state::MarketState;
use crate::usecase::review::{CreateReviewInput, UpdateReviewInput};

pub async fn create_review(
    State(state): State<MarketState>,
    AuthUser(user_id): AuthUser,
    AppPath(booking_id): AppPath<i64>,
    AppJson(payload): AppJson<ReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    payload.validate()?;

    let review = state
        .review
        .create(CreateReviewInput {
            booking_id,
            user_id,
            rating: payload.rating,
            review: payload.review,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

pub async fn get_review(
    State(state): State<MarketState>,
    AppPath(review_id): AppPath<i64>,
) -> Result<Json<ReviewResponse>, AppError> {
    let review = state.review.get(review_id).await?;
    Ok(Json(ReviewResponse::from(review)))
}

pub async fn update_review(
    State(state): State<MarketState>,
    AuthUser(user_id): AuthUser,
    AppPath(review_id): AppPath<i64>,
    AppJson(payload): AppJson<ReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    payload.validate()?;

    let review = state
        .review
        .update(UpdateReviewInput {
            review_id,
            user_id,
            rating: payload.rating,
            review: payload.review,
        })
        .await?;

    Ok(Json(ReviewResponse::from(review)))
}

pub async fn delete_review(
    State(state): State<MarketState>,
    AuthUser(user_id): AuthUser,
    AppPath(review_id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    state.review.delete(user_id, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn station_reviews(
    State(state): State<MarketState>,
    AppPath(station_id): AppPath<i64>,
) -> Result<Json<ReviewsResponse>, AppError> {
    let reviews = state.review.for_station(station_id).await?;
    Ok(Json(ReviewsResponse { reviews: reviews.into_iter().map(Into::into).collect() }))
}
