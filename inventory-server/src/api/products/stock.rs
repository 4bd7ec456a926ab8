//! Stock Variant Handlers
//!
//! `PUT` takes `multipart/form-data`: a `variants` JSON text field and
//! optional `images` files matched to the variants by position.

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use super::handler::discard_unreferenced;
use crate::api::multipart::{multipart_error, read_field_limited};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::product;
use crate::db::repository::stock::{self, NewVariant};
use crate::services::{MAX_STOCK_IMAGE_BYTES, StoredImage, normalize_image_url};
use crate::utils::validation::{
    MAX_QUANTITY, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, non_blank, validate_at_most,
};
use crate::utils::{AppError, AppResult, ErrorCode, ValidQuery};
use shared::models::{StockDetail, StockVariantInput};

#[derive(Debug, Deserialize)]
pub struct StockKeyQuery {
    pub color: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Parsed multipart body of a stock replace
#[derive(Debug, Default)]
struct StockForm {
    variants: Option<String>,
    /// One entry per `images` part; `None` for an empty file part
    images: Vec<Option<Vec<u8>>>,
}

async fn read_stock_form(mut multipart: Multipart) -> AppResult<StockForm> {
    let mut form = StockForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("variants") => {
                form.variants = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("images") => {
                let data = read_field_limited(field, MAX_STOCK_IMAGE_BYTES).await?;
                form.images.push((!data.is_empty()).then_some(data));
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Parse and validate the `variants` field
fn parse_variants(raw: Option<&str>) -> AppResult<Vec<StockVariantInput>> {
    let raw = raw.ok_or_else(|| AppError::invalid_field("variants", "variants is required"))?;
    let variants: Vec<StockVariantInput> = serde_json::from_str(raw).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid variants JSON: {e}"))
            .with_detail("field", "variants")
    })?;
    validate_variants(&variants)?;
    Ok(variants)
}

fn validate_variants(variants: &[StockVariantInput]) -> AppResult<()> {
    let mut keys = HashSet::with_capacity(variants.len());
    for (index, variant) in variants.iter().enumerate() {
        let color = variant.color.trim();
        if color.is_empty() {
            return Err(AppError::invalid_field(
                &format!("variants[{index}].color"),
                "color is required",
            ));
        }
        if color.chars().count() > MAX_SHORT_TEXT_LEN
            || variant
                .normalized_size()
                .is_some_and(|s| s.chars().count() > MAX_SHORT_TEXT_LEN)
            || variant
                .image_url
                .as_ref()
                .is_some_and(|u| u.chars().count() > MAX_URL_LEN)
        {
            return Err(AppError::invalid_field(
                &format!("variants[{index}]"),
                "variant field is too long",
            ));
        }
        if variant.quantity < 0 {
            return Err(AppError::new(ErrorCode::StockInvalidQuantity)
                .with_detail("field", format!("variants[{index}].quantity")));
        }
        validate_at_most(
            variant.quantity,
            &format!("variants[{index}].quantity"),
            MAX_QUANTITY,
        )?;
        if !keys.insert((color, variant.normalized_size())) {
            return Err(AppError::new(ErrorCode::StockVariantDuplicate)
                .with_detail("color", color)
                .with_detail("size", variant.normalized_size().unwrap_or_default()));
        }
    }
    Ok(())
}

/// GET /api/products/{id}/stock
pub async fn get_stock(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<StockDetail>> {
    let detail = stock::find_by_product(&state.db, user.id, id).await?;
    Ok(Json(detail))
}

/// PUT /api/products/{id}/stock - replace all variants
pub async fn replace_stock(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<StockDetail>> {
    let form = read_stock_form(multipart).await?;
    let variants = parse_variants(form.variants.as_deref())?;
    if form.images.len() > variants.len() {
        return Err(AppError::invalid_field(
            "images",
            format!(
                "{} images for {} variants",
                form.images.len(),
                variants.len()
            ),
        ));
    }

    // Ownership first so foreign products never reach the image store
    product::get(&state.db, user.id, id).await?;

    let mut saved = Vec::new();
    let result = match store_variant_images(&state, &variants, form.images, &mut saved).await {
        Ok(rows) => stock::replace(&state.db, user.id, id, &rows)
            .await
            .map_err(AppError::from),
        Err(e) => Err(e),
    };
    match result {
        Ok(detail) => Ok(Json(detail)),
        Err(e) => {
            discard_unreferenced(&state, &saved).await;
            Err(e)
        }
    }
}

/// Store the uploaded images by position and build the variant rows
async fn store_variant_images(
    state: &ServerState,
    variants: &[StockVariantInput],
    images: Vec<Option<Vec<u8>>>,
    saved: &mut Vec<StoredImage>,
) -> AppResult<Vec<NewVariant>> {
    let mut images = images.into_iter();
    let mut rows = Vec::with_capacity(variants.len());
    for variant in variants {
        let image_url = match images.next().flatten() {
            Some(data) => {
                let image = state.images.save_bytes(data).await?;
                let url = image.url.clone();
                saved.push(image);
                Some(url)
            }
            None => variant.image_url.as_deref().and_then(normalize_image_url),
        };
        rows.push(NewVariant {
            color: variant.color.trim().to_string(),
            size: variant.normalized_size().map(str::to_string),
            quantity: variant.quantity,
            image_url,
        });
    }
    Ok(rows)
}

/// DELETE /api/products/{id}/stock?color=&size=
pub async fn delete_by_key(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ValidQuery(query): ValidQuery<StockKeyQuery>,
) -> AppResult<StatusCode> {
    let color = non_blank(query.color.as_deref())
        .ok_or_else(|| AppError::invalid_field("color", "color is required"))?;
    let size = non_blank(query.size.as_deref());
    stock::delete_by_key(&state.db, user.id, id, color, size).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/products/{id}/stock/{variant_id}
pub async fn delete_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((id, variant_id)): Path<(i64, i64)>,
) -> AppResult<Json<MessageResponse>> {
    stock::delete_by_id(&state.db, user.id, id, variant_id).await?;
    Ok(Json(MessageResponse {
        message: "Stock variant deleted",
    }))
}
