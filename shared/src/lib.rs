//! Shared types for the inventory server
//!
//! Error codes, the unified [`error::AppError`] / [`error::ErrorBody`]
//! pair, domain models exchanged with the web client, and small helpers.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
