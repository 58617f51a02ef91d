//! Route modules and the top-level router

use axum::{Json, Router, middleware, response::IntoResponse, routing::get};
use serde_json::json;

use crate::{middleware::auth_middleware, state::AppState};

pub mod analytics;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod newsletter;
pub mod payouts;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .merge(auth::protected_router())
        .merge(catalog::router())
        .merge(payouts::router())
        .merge(analytics::router())
        .merge(cart::router())
        .merge(newsletter::protected_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(auth::public_router())
        .merge(newsletter::public_router())
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "wavehouse-api"
    }))
}
