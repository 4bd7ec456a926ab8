//! Supplier API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::supplier;
use crate::utils::validation::{MAX_NAME_LEN, non_blank, validate_required_text};
use crate::utils::{AppResult, ValidJson};
use shared::models::{Supplier, SupplierCreate, SupplierUpdate};

/// GET /api/suppliers
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Supplier>>> {
    let suppliers = supplier::find_all(&state.db, user.id).await?;
    Ok(Json(suppliers))
}

/// POST /api/suppliers
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<SupplierCreate>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let name = payload.name.trim();
    validate_required_text(name, "name", MAX_NAME_LEN)?;
    let created = supplier::create(&state.db, user.id, name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/suppliers/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<SupplierUpdate>,
) -> AppResult<Json<Supplier>> {
    let name = non_blank(payload.name.as_deref());
    if let Some(name) = name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    let updated = supplier::update(&state.db, user.id, id, name).await?;
    Ok(Json(updated))
}

/// DELETE /api/suppliers/{id} - removes its products and orders as well
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    supplier::delete(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
