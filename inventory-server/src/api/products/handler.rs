//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::product::{self, NewProduct};
use crate::services::{StoredImage, normalize_image_url};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PRICE, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, non_blank, parse_optional_i64,
    validate_at_most, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode, ValidJson, ValidQuery};
use shared::models::{Product, ProductBulkCreate, ProductBulkItem, ProductPositionUpdate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub supplier_id: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// GET /api/products?supplierId=&category=
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidQuery(query): ValidQuery<ProductListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let supplier_id = parse_optional_i64(query.supplier_id.as_deref(), "supplierId")?;
    let category = non_blank(query.category.as_deref());
    let products = product::find_all(&state.db, user.id, supplier_id, category).await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let found = product::get(&state.db, user.id, id).await?;
    Ok(Json(found))
}

fn validate_bulk_item(index: usize, item: &ProductBulkItem) -> AppResult<()> {
    let field = |name: &str| format!("items[{index}].{name}");
    validate_required_text(&item.name, &field("name"), MAX_NAME_LEN)?;
    validate_required_text(&item.sku, &field("sku"), MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&item.category, &field("category"), MAX_NAME_LEN)?;
    if item.price < 0 {
        return Err(
            AppError::new(ErrorCode::ProductInvalidPrice).with_detail("field", field("price"))
        );
    }
    validate_at_most(item.price, &field("price"), MAX_PRICE)?;
    validate_optional_text(&item.image_url, &field("imageUrl"), MAX_URL_LEN)?;
    Ok(())
}

/// Remove files written for a request whose database write failed
///
/// Only files this request created and that no row references are
/// deleted; failures are logged and swallowed.
pub(super) async fn discard_unreferenced(state: &ServerState, images: &[StoredImage]) {
    for image in images.iter().filter(|i| i.created) {
        match product::image_in_use(&state.db, &image.url).await {
            Ok(false) => {
                if let Err(e) = state.images.remove(&image.filename).await {
                    tracing::warn!(filename = %image.filename, error = %e, "Failed to discard image");
                }
            }
            Ok(true) => {}
            Err(e) => {
                tracing::warn!(filename = %image.filename, error = %e, "Image reference check failed");
            }
        }
    }
}

/// Store the base64 images of a bulk create and build the rows
async fn store_bulk_items(
    state: &ServerState,
    items: Vec<ProductBulkItem>,
    saved: &mut Vec<StoredImage>,
) -> AppResult<Vec<NewProduct>> {
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let image_url = match non_blank(item.image_base64.as_deref()) {
            Some(data_url) => {
                let image = state.images.save_data_url(data_url).await?;
                let url = image.url.clone();
                saved.push(image);
                Some(url)
            }
            None => item.image_url.as_deref().and_then(normalize_image_url),
        };
        rows.push(NewProduct {
            category: item.category.trim().to_string(),
            price: item.price,
            name: item.name.trim().to_string(),
            sku: item.sku.trim().to_string(),
            image_url,
            has_sizes: item.has_sizes.unwrap_or(false),
        });
    }
    Ok(rows)
}

/// POST /api/products/bulk - create several products of one supplier
///
/// Base64 images are stored first; the rows are then inserted in one
/// transaction. Images written here are removed again if that fails.
pub async fn bulk_create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<ProductBulkCreate>,
) -> AppResult<(StatusCode, Json<Vec<Product>>)> {
    if payload.items.is_empty() {
        return Err(AppError::invalid_field("items", "items must not be empty"));
    }
    for (index, item) in payload.items.iter().enumerate() {
        validate_bulk_item(index, item)?;
    }

    let mut saved = Vec::new();
    let result = match store_bulk_items(&state, payload.items, &mut saved).await {
        Ok(rows) => product::bulk_create(&state.db, user.id, payload.supplier_id, rows)
            .await
            .map_err(AppError::from),
        Err(e) => Err(e),
    };
    let created = match result {
        Ok(created) => created,
        Err(e) => {
            discard_unreferenced(&state, &saved).await;
            return Err(e);
        }
    };

    tracing::info!(
        user_id = user.id,
        supplier_id = payload.supplier_id,
        count = created.len(),
        "Products created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/products/order - save drag-and-drop grid positions
pub async fn update_positions(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<ProductPositionUpdate>,
) -> AppResult<Json<SuccessResponse>> {
    let positions: Vec<_> = payload.items.into_iter().filter(|p| p.is_valid()).collect();
    if positions.is_empty() {
        return Err(AppError::invalid_request("No valid items provided"));
    }

    product::update_positions(&state.db, user.id, payload.supplier_id, &positions).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    product::delete(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
