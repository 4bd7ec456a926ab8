//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::category;
use crate::utils::validation::{MAX_NAME_LEN, non_blank, validate_required_text};
use crate::utils::{AppResult, ValidJson};
use shared::models::{Category, CategoryCreate, CategoryUpdate};

/// GET /api/categories - list, seeding the defaults on first use
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Category>>> {
    let categories = category::find_all_or_seed(&state.db, user.id).await?;
    Ok(Json(categories))
}

/// POST /api/categories - create
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<CategoryCreate>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let name = payload.name.trim();
    validate_required_text(name, "name", MAX_NAME_LEN)?;
    let created = category::create(&state.db, user.id, name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/categories/{id} - rename; an empty name changes nothing
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    let name = non_blank(payload.name.as_deref());
    if let Some(name) = name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    let updated = category::update(&state.db, user.id, id, name).await?;
    Ok(Json(updated))
}

/// DELETE /api/categories/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    category::delete(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
