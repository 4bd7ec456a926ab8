//! Product API module
//!
//! Products, their grid positions and their stock variants.

mod handler;
mod stock;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

use crate::core::ServerState;

/// Body limit of a stock update (variants JSON plus several images)
const MAX_STOCK_REQUEST_BYTES: usize = 1024 * 1024 * 1024;

/// Body limit of JSON requests carrying base64 images
const MAX_BULK_REQUEST_BYTES: usize = 256 * 1024 * 1024;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        // Static segments before /{id}
        .route(
            "/bulk",
            post(handler::bulk_create).layer(DefaultBodyLimit::max(MAX_BULK_REQUEST_BYTES)),
        )
        .route("/order", post(handler::update_positions))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route(
            "/{id}/stock",
            get(stock::get_stock)
                .put(stock::replace_stock)
                .delete(stock::delete_by_key)
                .layer(DefaultBodyLimit::max(MAX_STOCK_REQUEST_BYTES)),
        )
        .route("/{id}/stock/{variant_id}", delete(stock::delete_by_id))
}
