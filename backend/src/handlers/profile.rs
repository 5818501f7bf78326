//! HTTP handlers for profile endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::profile::{Profile, UpdateProfileInput, UserProfileEntry};
use crate::services::ProfileService;
use crate::AppState;
use shared::UserRole;

/// Retrieve a profile by account id
pub async fn get_profile(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Profile>> {
    let service = ProfileService::new(state.db);
    let profile = service.get_profile(user_id).await?;
    Ok(Json(profile))
}

/// Update a profile (owner only)
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<i64>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Json<Profile>> {
    let service = ProfileService::new(state.db);
    let profile = service
        .update_profile(&current_user.0, user_id, input)
        .await?;
    Ok(Json(profile))
}

/// List all business accounts with their profile data
pub async fn list_business_profiles(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<UserProfileEntry>>> {
    let service = ProfileService::new(state.db);
    let profiles = service.list_by_role(UserRole::Business).await?;
    Ok(Json(profiles))
}

/// List all customer accounts with their profile data
pub async fn list_customer_profiles(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<UserProfileEntry>>> {
    let service = ProfileService::new(state.db);
    let profiles = service.list_by_role(UserRole::Customer).await?;
    Ok(Json(profiles))
}
