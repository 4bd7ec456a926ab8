use thiserror::Error;

/// Server startup and runtime errors
///
/// Request-level failures use [`crate::AppError`]; these only surface
/// from [`crate::Server::run`] and state initialization.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<crate::AppError> for ServerError {
    fn from(err: crate::AppError) -> Self {
        match err.code {
            crate::ErrorCode::DatabaseError => ServerError::Database(err.message),
            crate::ErrorCode::StorageError => ServerError::Storage(err.message),
            crate::ErrorCode::ConfigError => ServerError::Config(err.message),
            _ => ServerError::Internal(anyhow::anyhow!(err.message)),
        }
    }
}

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;
