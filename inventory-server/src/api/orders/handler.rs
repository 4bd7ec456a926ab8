//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order;
use crate::utils::validation::{
    MAX_QUANTITY, MAX_SHORT_TEXT_LEN, parse_optional_i64, validate_at_most, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode, ValidJson, ValidQuery};
use shared::models::{Order, OrderCreate, OrderItemInput, OrderStatus, OrderStatusUpdate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub supplier_id: Option<String>,
}

fn parse_status(value: &str) -> AppResult<OrderStatus> {
    value
        .trim()
        .parse()
        .map_err(|msg: String| AppError::with_message(ErrorCode::OrderInvalidStatus, msg))
}

fn validate_items(items: &[OrderItemInput]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    for (index, item) in items.iter().enumerate() {
        if item.quantity < 1 {
            return Err(AppError::invalid_field(
                &format!("items[{index}].quantity"),
                "quantity must be at least 1",
            ));
        }
        validate_at_most(item.quantity, &format!("items[{index}].quantity"), MAX_QUANTITY)?;
        validate_required_text(
            &item.selected_color,
            &format!("items[{index}].selectedColor"),
            MAX_SHORT_TEXT_LEN,
        )?;
    }
    Ok(())
}

/// Trim colors and fold blank sizes into "no size"
fn normalize_items(items: Vec<OrderItemInput>) -> Vec<OrderItemInput> {
    items
        .into_iter()
        .map(|item| OrderItemInput {
            selected_color: item.selected_color.trim().to_string(),
            selected_size: item
                .selected_size
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            ..item
        })
        .collect()
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    validate_items(&payload.items)?;
    let items = normalize_items(payload.items);
    let created = order::create(&state.db, user.id, payload.supplier_id, &items).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/orders?status=&supplierId=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidQuery(query): ValidQuery<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(parse_status(s)?),
    };
    let supplier_id = parse_optional_i64(query.supplier_id.as_deref(), "supplierId")?;
    let orders = order::find_all(&state.db, user.id, status, supplier_id).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let found = order::get_with_items(&state.db, user.id, id).await?;
    Ok(Json(found))
}

/// PATCH /api/orders/{id}
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let status = parse_status(&payload.status)?;
    let updated = order::update_status(&state.db, user.id, id, status).await?;
    tracing::info!(order_id = id, status = %status, "Order status updated");
    Ok(Json(updated))
}

/// DELETE /api/orders/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    order::delete(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
