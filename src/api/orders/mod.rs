//! Order API Module
//!
//! Placement and customer tracking are public; staff queues and status
//! transitions sit behind the auth middleware. All stock mutation goes
//! through the status transition path.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Placement (public) + staff queue
        .route("/", post(handler::create).get(handler::list))
        // Staff views
        .route("/history", get(handler::history))
        .route("/progress", get(handler::progress))
        // Lifecycle transition
        .route("/{id}/status", put(handler::update_status).get(handler::get_status))
        // Customer session history
        .route("/session/{session_id}", get(handler::by_session))
}
