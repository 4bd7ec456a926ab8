//! Auth API Handlers

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use http::header;
use serde_json::json;

use crate::auth::password::{hash_password, verify_dummy, verify_password};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::validation::{MAX_PASSWORD_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ValidJson};
use shared::models::{Credentials, LoginResponse, MeResponse, UserInfo};

fn validate_credentials(creds: &Credentials) -> AppResult<()> {
    validate_required_text(creds.username.trim(), "username", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&creds.password, "password", MAX_PASSWORD_LEN)?;
    Ok(())
}

/// POST /api/auth/register - create an account
pub async fn register(
    State(state): State<ServerState>,
    ValidJson(creds): ValidJson<Credentials>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    validate_credentials(&creds)?;
    let username = creds.username.trim();

    let password_hash = hash_password(&creds.password)?;
    let created = user::create(&state.db, username, &password_hash).await?;

    security_log!("INFO", "register", user_id = created.id, username = username);
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// POST /api/auth/login - verify credentials and set the session cookie
pub async fn login(
    State(state): State<ServerState>,
    ValidJson(creds): ValidJson<Credentials>,
) -> AppResult<impl IntoResponse> {
    validate_credentials(&creds)?;
    let username = creds.username.trim();

    let found = user::find_by_username(&state.db, username).await?;
    let verified = match &found {
        Some(u) => verify_password(&creds.password, &u.password_hash),
        None => verify_dummy(&creds.password),
    };
    let user = match found {
        Some(u) if verified => u,
        _ => {
            security_log!("WARN", "login_failed", username = username);
            return Err(AppError::invalid_credentials());
        }
    };

    let jwt = state.get_jwt_service();
    let token = jwt
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
    let cookie = state
        .config
        .cookie
        .session_cookie(&token, jwt.config.expiration_seconds());

    security_log!("INFO", "login", user_id = user.id, username = user.username.as_str());
    Ok(([(header::SET_COOKIE, cookie)], Json(LoginResponse { token })))
}

/// POST /api/auth/logout - clear the session cookie
pub async fn logout(State(state): State<ServerState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, state.config.cookie.clear_cookie())],
        Json(json!({ "message": "Logged out" })),
    )
}

/// GET /api/auth/me - the authenticated user
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<MeResponse>> {
    // A token can outlive its account
    let user = user::find_by_id(&state.db, current.id)
        .await?
        .ok_or_else(AppError::unauthorized)?;
    Ok(Json(MeResponse {
        user: UserInfo::from(user),
    }))
}
