//! HTTP handlers for order endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::order::{CreateOrderInput, Order, UpdateOrderInput};
use crate::services::OrderService;
use crate::AppState;
use shared::OrderStatus;

/// List the current user's orders from either side of the relationship
pub async fn list_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db);
    let orders = service.list_orders(&current_user.0).await?;
    Ok(Json(orders))
}

/// Create an order from an offer detail (customers only)
pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let service = OrderService::new(state.db);
    let order = service.create_order(&current_user.0, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Update an order's status (business user of the order only)
pub async fn update_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<i64>,
    Json(input): Json<UpdateOrderInput>,
) -> AppResult<Json<Order>> {
    let service = OrderService::new(state.db);
    let order = service
        .update_status(&current_user.0, order_id, input)
        .await?;
    Ok(Json(order))
}

/// Delete an order (staff only)
pub async fn delete_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = OrderService::new(state.db);
    service.delete_order(&current_user.0, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Open-order count response
#[derive(Debug, Serialize)]
pub struct OrderCountResponse {
    pub order_count: i64,
}

/// Completed-order count response
#[derive(Debug, Serialize)]
pub struct CompletedOrderCountResponse {
    pub completed_order_count: i64,
}

/// Count in-progress orders for a business user
pub async fn get_order_count(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<OrderCountResponse>> {
    let service = OrderService::new(state.db);
    let order_count = service
        .count_orders_for_business(user_id, OrderStatus::InProgress)
        .await?;
    Ok(Json(OrderCountResponse { order_count }))
}

/// Count completed orders for a business user
pub async fn get_completed_order_count(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<CompletedOrderCountResponse>> {
    let service = OrderService::new(state.db);
    let completed_order_count = service
        .count_orders_for_business(user_id, OrderStatus::Completed)
        .await?;
    Ok(Json(CompletedOrderCountResponse {
        completed_order_count,
    }))
}
