//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::services::auth::{AuthResponse, LoginInput, RegisterInput};
use crate::services::AuthService;
use crate::AppState;

/// Register a new account and its profile
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let service = AuthService::new(state.db, &state.config);
    let response = service.register(input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with username and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthResponse>> {
    let service = AuthService::new(state.db, &state.config);
    let response = service.login(input).await?;
    Ok(Json(response))
}
