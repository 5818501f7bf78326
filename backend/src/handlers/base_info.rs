//! HTTP handler for the public dashboard aggregates

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::base_info::BaseInfo;
use crate::services::BaseInfoService;
use crate::AppState;

/// Return platform-wide counts and the average rating (public)
pub async fn get_base_info(State(state): State<AppState>) -> AppResult<Json<BaseInfo>> {
    let service = BaseInfoService::new(state.db);
    let info = service.get_base_info().await?;
    Ok(Json(info))
}
