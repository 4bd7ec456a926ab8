//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::HeaderMap;

use crate::AppError;
use crate::auth::cookie::token_from_cookies;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// API paths reachable without a session
const PUBLIC_API_PATHS: [&str; 3] = ["/api/auth/login", "/api/auth/register", "/api/auth/logout"];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_API_PATHS.contains(&path)
}

/// Session token from the `accesstoken` cookie, falling back to a Bearer header
pub fn request_token(headers: &HeaderMap) -> Option<&str> {
    token_from_cookies(headers).or_else(|| {
        headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_from_header)
    })
}

/// Map a validation failure onto the client-facing error
pub fn jwt_rejection(err: JwtError) -> AppError {
    match err {
        JwtError::ExpiredToken => AppError::token_expired(),
        _ => AppError::invalid_token("Invalid token"),
    }
}

/// Authentication middleware
///
/// Validates the session token and inserts [`CurrentUser`] into the request
/// extensions.
///
/// # Skipped
///
/// - `OPTIONS *` (CORS preflight)
/// - non `/api/` paths (health, uploaded images)
/// - `/api/auth/login`, `/api/auth/register`, `/api/auth/logout`
///
/// # Errors
///
/// | Case | Response |
/// |------|----------|
/// | no token | 401 Unauthorized |
/// | expired token | 401 TokenExpired |
/// | invalid token | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") || is_public_path(path) {
        return Ok(next.run(req).await);
    }

    let Some(token) = request_token(req.headers()) else {
        security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
        return Err(AppError::unauthorized());
    };

    let user = state
        .get_jwt_service()
        .validate_token(token)
        .and_then(CurrentUser::try_from);

    match user {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );
            Err(jwt_rejection(e))
        }
    }
}
