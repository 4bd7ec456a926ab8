//! Upload Handlers

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
};

use crate::api::multipart::{multipart_error, read_field_limited};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::{MAX_STOCK_IMAGE_BYTES, StoredImage};
use crate::utils::{AppError, AppResult};

/// POST /api/uploads/images - multipart field `file`
pub async fn upload(
    State(state): State<ServerState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<StoredImage>> {
    let mut data = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            data = Some(read_field_limited(field, MAX_STOCK_IMAGE_BYTES).await?);
            break;
        }
    }

    let data = data.ok_or_else(|| {
        AppError::invalid_field("file", "No 'file' field found. Field name must be 'file'")
    })?;
    let stored = state.images.save_bytes(data).await?;

    tracing::info!(
        user_id = user.id,
        filename = %stored.filename,
        size = stored.size,
        "Image uploaded"
    );
    Ok(Json(stored))
}

/// GET /uploads/images/{filename}
pub async fn serve(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (content, content_type) = state.images.read(&filename).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        content,
    ))
}
