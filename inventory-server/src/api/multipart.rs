//! Multipart helpers

use axum::extract::multipart::Field;

use crate::utils::{AppError, AppResult, ErrorCode};

/// Read a multipart field, failing once it grows past `limit` bytes
pub async fn read_field_limited(mut field: Field<'_>, limit: usize) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {e}")))?
    {
        if data.len() + chunk.len() > limit {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!("File is larger than {}MB", limit / 1024 / 1024),
            ));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

pub fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::validation(format!("Invalid multipart request: {e}"))
}
