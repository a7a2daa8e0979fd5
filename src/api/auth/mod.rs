//! Authentication Routes

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Build authentication router
/// - /api/auth/login, /api/auth/register: public (no auth required)
/// - profile/password/logout: protected (global require_auth middleware)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/profile", get(handler::profile))
        .route("/api/auth/password", put(handler::change_password))
        .route("/api/auth/logout", post(handler::logout))
}
