//! Image Store
//!
//! Every incoming image is decoded, re-encoded as JPEG and written under
//! the uploads directory as `{sha256}.jpg`. Identical content lands in
//! the same file. Stored images are public at `/uploads/images/{name}`.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::utils::{AppError, AppResult, ErrorCode};

/// Maximum size of one uploaded image (200MB)
pub const MAX_STOCK_IMAGE_BYTES: usize = 200 * 1024 * 1024;

/// Public URL prefix of stored images
pub const PUBLIC_PREFIX: &str = "/uploads/images";

/// JPEG quality of stored images
const JPEG_QUALITY: u8 = 85;

/// Formats accepted in `data:image/<ext>;base64,` URLs
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// A stored image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    pub url: String,
    pub filename: String,
    pub size: usize,
    /// Written by this call rather than reused
    #[serde(skip)]
    pub created: bool,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Decode any supported image and re-encode it as JPEG
fn reencode_as_jpeg(data: &[u8]) -> AppResult<Vec<u8>> {
    let img = image::load_from_memory(data).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidImage, format!("Invalid image: {e}"))
    })?;

    let mut buffer = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buffer), JPEG_QUALITY);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| AppError::internal(format!("Failed to compress image: {e}")))?;
    Ok(buffer)
}

/// Reject names that could leave the images directory
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the images directory if missing
    pub fn ensure_dir(&self) -> AppResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::with_message(
                ErrorCode::StorageError,
                format!("Failed to create images directory: {e}"),
            )
        })
    }

    /// Validate, re-encode and store raw image bytes
    pub async fn save_bytes(&self, data: Vec<u8>) -> AppResult<StoredImage> {
        if data.is_empty() {
            return Err(AppError::validation("Empty file provided"));
        }
        if data.len() > MAX_STOCK_IMAGE_BYTES {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!(
                    "File too large. Maximum size is {}MB",
                    MAX_STOCK_IMAGE_BYTES / 1024 / 1024
                ),
            ));
        }

        let encoded = tokio::task::spawn_blocking(move || reencode_as_jpeg(&data))
            .await
            .map_err(|e| AppError::internal(format!("Image task failed: {e}")))??;

        let filename = format!("{}.jpg", calculate_hash(&encoded));
        let path = self.dir.join(&filename);

        let created = !tokio::fs::try_exists(&path).await.unwrap_or(false);
        if !created {
            tracing::debug!(filename = %filename, "Duplicate image, reusing stored file");
        } else {
            self.ensure_dir()?;
            tokio::fs::write(&path, &encoded).await.map_err(|e| {
                AppError::with_message(ErrorCode::StorageError, format!("Failed to save file: {e}"))
            })?;
            tracing::info!(filename = %filename, size = encoded.len(), "Image stored");
        }

        Ok(StoredImage {
            url: format!("{PUBLIC_PREFIX}/{filename}"),
            filename,
            size: encoded.len(),
            created,
        })
    }

    /// Delete a stored file; a file that is already gone is not an error
    pub async fn remove(&self, filename: &str) -> AppResult<()> {
        if !is_safe_filename(filename) {
            return Err(AppError::invalid_request("Invalid filename"));
        }
        match tokio::fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => {
                tracing::info!(filename = %filename, "Image removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_message(
                ErrorCode::StorageError,
                format!("Failed to remove file: {e}"),
            )),
        }
    }

    /// Store an image given as `data:image/<ext>;base64,<payload>`
    pub async fn save_data_url(&self, data_url: &str) -> AppResult<StoredImage> {
        let (header, payload) = data_url
            .trim()
            .split_once(";base64,")
            .ok_or_else(|| AppError::with_message(ErrorCode::InvalidFormat, "Invalid image data URL"))?;
        let ext = header
            .strip_prefix("data:image/")
            .ok_or_else(|| AppError::with_message(ErrorCode::InvalidFormat, "Invalid image data URL"))?
            .to_ascii_lowercase();
        if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!(
                    "Unsupported file format '{}'. Supported: {}",
                    ext,
                    SUPPORTED_FORMATS.join(", ")
                ),
            ));
        }

        let data = BASE64
            .decode(payload.trim())
            .map_err(|e| AppError::with_message(ErrorCode::InvalidImage, format!("Invalid base64 image: {e}")))?;
        self.save_bytes(data).await
    }

    /// Read a stored image and its content type
    pub async fn read(&self, filename: &str) -> AppResult<(Vec<u8>, String)> {
        if !is_safe_filename(filename) {
            return Err(AppError::invalid_request("Invalid filename"));
        }
        let path = self.dir.join(filename);
        let content = tokio::fs::read(&path)
            .await
            .map_err(|_| AppError::new(ErrorCode::FileNotFound))?;
        let mime = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok((content, mime))
    }
}

/// Normalize a client-supplied image URL to a site-relative path
///
/// `uploads/x` becomes `/uploads/x`; absolute URLs pointing into
/// `/uploads/` are reduced to their path. Anything else is kept as is.
pub fn normalize_image_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("/uploads/") {
        return Some(url.to_string());
    }
    if url.starts_with("uploads/") {
        return Some(format!("/{url}"));
    }

    if let Some((_, rest)) = url.split_once("://") {
        let path = rest.find('/').map(|i| &rest[i..]).unwrap_or("/");
        let path = path.split(['?', '#']).next().unwrap_or(path);
        if path.starts_with("/uploads/") {
            return Some(path.to_string());
        }
    }

    match url.find("/uploads/") {
        Some(index) => Some(url[index..].to_string()),
        None => Some(url.to_string()),
    }
}
