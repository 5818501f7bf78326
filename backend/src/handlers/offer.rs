//! HTTP handlers for offer endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::offer::{
    CreateOfferInput, Offer, OfferDetail, OfferListItem, OfferListQuery, UpdateOfferInput,
};
use crate::services::OfferService;
use crate::AppState;
use shared::PaginatedResponse;

/// List offers with filtering, search, ordering, and pagination (public)
pub async fn list_offers(
    State(state): State<AppState>,
    Query(query): Query<OfferListQuery>,
) -> AppResult<Json<PaginatedResponse<OfferListItem>>> {
    let service = OfferService::new(state.db);
    let page = service.list_offers(query).await?;
    Ok(Json(page))
}

/// Publish a new offer (business users only)
pub async fn create_offer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOfferInput>,
) -> AppResult<(StatusCode, Json<Offer>)> {
    let service = OfferService::new(state.db);
    let offer = service.create_offer(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

/// Retrieve one offer with its tiers
pub async fn get_offer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(offer_id): Path<i64>,
) -> AppResult<Json<Offer>> {
    let service = OfferService::new(state.db);
    let offer = service.get_offer(offer_id).await?;
    Ok(Json(offer))
}

/// Update an offer and its tiers (owner only)
pub async fn update_offer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(offer_id): Path<i64>,
    Json(input): Json<UpdateOfferInput>,
) -> AppResult<Json<Offer>> {
    let service = OfferService::new(state.db);
    let offer = service
        .update_offer(&current_user.0, offer_id, input)
        .await?;
    Ok(Json(offer))
}

/// Delete an offer (owner only)
pub async fn delete_offer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(offer_id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = OfferService::new(state.db);
    service.delete_offer(&current_user.0, offer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Retrieve a single offer detail
pub async fn get_offer_detail(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(detail_id): Path<i64>,
) -> AppResult<Json<OfferDetail>> {
    let service = OfferService::new(state.db);
    let detail = service.get_offer_detail(detail_id).await?;
    Ok(Json(detail))
}
