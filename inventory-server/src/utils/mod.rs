//! Utility module
//!
//! - [`AppError`] / [`ErrorBody`] (from `shared::error`)
//! - request extractors with uniform rejections
//! - logger, validation and time helpers

pub mod error;
pub mod extract;
pub mod logger;
pub mod time;
pub mod validation;

pub use error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
pub use extract::{ValidJson, ValidQuery};
