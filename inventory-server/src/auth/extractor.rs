//! `CurrentUser` extractor
//!
//! Handlers take [`CurrentUser`] as an argument. The middleware normally
//! has already validated the token; otherwise it is validated here.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::auth::middleware::{jwt_rejection, request_token};
use crate::core::ServerState;
use crate::security_log;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let Some(token) = request_token(&parts.headers) else {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
            return Err(AppError::unauthorized());
        };

        let user = state
            .get_jwt_service()
            .validate_token(token)
            .and_then(CurrentUser::try_from)
            .map_err(|e| {
                security_log!(
                    "WARN",
                    "auth_failed",
                    error = format!("{}", e),
                    uri = format!("{:?}", parts.uri)
                );
                jwt_rejection(e)
            })?;

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
