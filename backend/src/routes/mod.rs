//! Route definitions for the Service Marketplace Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, optional_auth_middleware},
    AppState,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .route("/registration/", post(handlers::register))
        .route("/login/", post(handlers::login))
        // Dashboard aggregates (public)
        .route("/base-info/", get(handlers::get_base_info))
        // Offer list: public reads, business-only create
        .merge(offer_list_routes())
        // Protected routes
        .merge(offer_routes())
        .merge(order_routes())
        .merge(review_routes())
        .merge(profile_routes())
}

/// Offer list and create share one path; reads are public, so the token is
/// decoded when present and the create handler insists on it
fn offer_list_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/offers/",
            get(handlers::list_offers).post(handlers::create_offer),
        )
        .route_layer(middleware::from_fn(optional_auth_middleware))
}

/// Offer retrieval and owner-gated writes (protected)
fn offer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/offers/:offer_id/",
            get(handlers::get_offer)
                .patch(handlers::update_offer)
                .delete(handlers::delete_offer),
        )
        .route("/offerdetails/:detail_id/", get(handlers::get_offer_detail))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Order management routes (protected)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders/",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route(
            "/orders/:order_id/",
            axum::routing::patch(handlers::update_order).delete(handlers::delete_order),
        )
        .route("/order-count/:user_id/", get(handlers::get_order_count))
        .route(
            "/completed-order-count/:user_id/",
            get(handlers::get_completed_order_count),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Review management routes (protected)
fn review_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reviews/",
            get(handlers::list_reviews).post(handlers::create_review),
        )
        .route(
            "/reviews/:review_id/",
            axum::routing::patch(handlers::update_review).delete(handlers::delete_review),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Profile routes (protected)
fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile/:user_id/",
            get(handlers::get_profile).patch(handlers::update_profile),
        )
        .route(
            "/profiles/business/",
            get(handlers::list_business_profiles),
        )
        .route(
            "/profiles/customer/",
            get(handlers::list_customer_profiles),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
