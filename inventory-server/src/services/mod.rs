//! Services
//!
//! - [`ImageStore`] - content-addressed image files on disk

pub mod image_store;

pub use image_store::{ImageStore, MAX_STOCK_IMAGE_BYTES, StoredImage, normalize_image_url};
