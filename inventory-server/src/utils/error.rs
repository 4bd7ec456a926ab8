//! Error bridge
//!
//! Re-exports the unified error types from `shared` and converts
//! repository errors into API errors. Database failures are logged here
//! and reach the client as a generic internal error.

pub use shared::error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};

use crate::db::repository::RepoError;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(resource) => AppError::not_found(&resource),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::InUse(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::App(app) => app,
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}
