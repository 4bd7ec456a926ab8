//! API routes
//!
//! - [`health`] - health check (public)
//! - [`auth`] - register, login, logout, current user
//! - [`categories`] - product categories
//! - [`suppliers`] - suppliers
//! - [`products`] - products, grid positions and stock variants
//! - [`orders`] - purchase orders
//! - [`statistics`] - product statistics
//! - [`metadata`] - option lists for the client
//! - [`uploads`] - image upload and serving

pub mod auth;
pub mod categories;
pub mod health;
pub mod metadata;
pub mod multipart;
pub mod orders;
pub mod products;
pub mod statistics;
pub mod suppliers;
pub mod uploads;

use axum::Router;
use axum::middleware;
use http::{HeaderName, HeaderValue, Method, header};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator (uuid v4)
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// HTTP access log
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());
    response
}

/// CORS for the configured browser origin, credentials allowed
fn cors_layer(origin: &str) -> CorsLayer {
    let origin = HeaderValue::from_str(origin).unwrap_or_else(|_| {
        tracing::warn!(origin, "Invalid CORS_ORIGIN, falling back to http://localhost:5173");
        HeaderValue::from_static("http://localhost:5173")
    });
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Public
        .merge(health::router())
        .merge(uploads::public_router())
        // Auth (register / login / logout are public, see require_auth)
        .merge(auth::router())
        // Data APIs - authentication required
        .merge(categories::router())
        .merge(suppliers::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(statistics::router())
        .merge(metadata::router())
        .merge(uploads::router())
}

/// Build the fully configured application
///
/// Used by the HTTP server and by tests driving the router directly.
pub fn build_app(state: ServerState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router()
        // JWT session check; skips public routes internally
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        .layer(cors)
}
