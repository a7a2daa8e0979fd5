//! Menu API 模块
//!
//! Catalog CRUD, the storefront dishes view, and stock ledger endpoints.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/dishes", get(handler::dishes))
        .nest("/api/menus", menu_routes())
}

fn menu_routes() -> Router<ServerState> {
    // 目录修改和库存操作仅限管理员
    let admin = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/stock/reserve", post(handler::reserve_stock))
        .route("/{id}/stock/restock", post(handler::restock))
        .route("/{id}/stock/reduce", post(handler::reduce_stock))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .merge(admin)
}
