//! HTTP handlers for review endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::review::{CreateReviewInput, Review, ReviewListQuery, UpdateReviewInput};
use crate::services::ReviewService;
use crate::AppState;

/// List reviews, filterable by business user and reviewer
pub async fn list_reviews(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReviewListQuery>,
) -> AppResult<Json<Vec<Review>>> {
    let service = ReviewService::new(state.db);
    let reviews = service.list_reviews(query).await?;
    Ok(Json(reviews))
}

/// Create a review (customers only)
pub async fn create_review(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateReviewInput>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let service = ReviewService::new(state.db);
    let review = service.create_review(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Update a review (reviewer only)
pub async fn update_review(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(review_id): Path<i64>,
    Json(input): Json<UpdateReviewInput>,
) -> AppResult<Json<Review>> {
    let service = ReviewService::new(state.db);
    let review = service
        .update_review(&current_user.0, review_id, input)
        .await?;
    Ok(Json(review))
}

/// Delete a review (reviewer only)
pub async fn delete_review(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(review_id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = ReviewService::new(state.db);
    service.delete_review(&current_user.0, review_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
