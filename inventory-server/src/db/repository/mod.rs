//! Repository Module
//!
//! Free functions over a `SqlitePool`, one file per table group. Every
//! function touching user data takes the owner's `user_id`.

pub mod category;
pub mod order;
pub mod product;
pub mod statistics;
pub mod stock;
pub mod supplier;
pub mod user;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("In use: {0}")]
    InUse(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Domain error carrying its own code
    #[error("{0}")]
    App(AppError),
}

impl RepoError {
    /// Domain error with the code's default message
    pub fn code(code: ErrorCode) -> Self {
        RepoError::App(AppError::new(code))
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return RepoError::Duplicate(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return RepoError::InUse(db_err.message().to_string());
            }
        }
        RepoError::Database(err.to_string())
    }
}

impl From<AppError> for RepoError {
    fn from(err: AppError) -> Self {
        RepoError::App(err)
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
