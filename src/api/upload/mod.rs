//! Upload Routes
//!
//! Local file-backed image store: upload endpoint for catalog management,
//! public serving route for the storefront.

pub(crate) mod handler;

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use http::header;

use crate::core::ServerState;

/// Serve file response
enum ServeFileResponse {
    Ok(String, Bytes),
    NotFound,
    BadRequest(&'static str),
}

impl IntoResponse for ServeFileResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServeFileResponse::Ok(content_type, content) => (
                http::StatusCode::OK,
                [(header::CONTENT_TYPE, content_type)],
                content,
            )
                .into_response(),
            ServeFileResponse::NotFound => {
                (http::StatusCode::NOT_FOUND, "File not found").into_response()
            }
            ServeFileResponse::BadRequest(msg) => {
                (http::StatusCode::BAD_REQUEST, msg).into_response()
            }
        }
    }
}

/// Serve uploaded image handler (public)
async fn serve_uploaded_file(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> ServeFileResponse {
    // Security check: prevent path traversal
    if filename.is_empty()
        || filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
    {
        return ServeFileResponse::BadRequest("Invalid filename");
    }

    let file_path = state.config.images_dir().join(&filename);
    let content_type = mime_guess::from_path(&file_path)
        .first_or_octet_stream()
        .to_string();
    match tokio::fs::read(&file_path).await {
        Ok(content) => ServeFileResponse::Ok(content_type, content.into()),
        Err(_) => ServeFileResponse::NotFound,
    }
}

/// Build upload router
pub fn router() -> Router<ServerState> {
    Router::new()
        // Upload image API - authentication required
        .route("/api/image/upload", post(handler::upload))
        // Serve uploaded images - public access
        .route("/api/image/{filename}", get(serve_uploaded_file))
}
