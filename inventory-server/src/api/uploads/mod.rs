//! Upload Routes
//!
//! `POST /api/uploads/images` stores an image (authenticated);
//! `GET /uploads/images/{filename}` serves stored images publicly.

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::core::ServerState;
use crate::services::MAX_STOCK_IMAGE_BYTES;

/// Authenticated upload API
pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/uploads/images",
        // Multipart framing on top of the image itself
        post(handler::upload).layer(DefaultBodyLimit::max(MAX_STOCK_IMAGE_BYTES + 1024 * 1024)),
    )
}

/// Stored images, public like static files
pub fn public_router() -> Router<ServerState> {
    Router::new().route("/uploads/images/{filename}", get(handler::serve))
}
