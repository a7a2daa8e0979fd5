//! Storefront Content API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let admin = Router::new()
        .route("/api/onboarding", post(handler::create_onboarding))
        .route("/api/carousel", post(handler::create_carousel))
        .route(
            "/api/carousel/{id}",
            axum::routing::delete(handler::delete_carousel),
        )
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/api/onboarding", get(handler::list_onboarding))
        .route("/api/carousel", get(handler::list_carousel))
        .merge(admin)
}
