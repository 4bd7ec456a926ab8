//! Inventory Server - purchase-order and stock management backend
//!
//! # Module layout
//!
//! ```text
//! inventory-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT session, cookie, password, middleware
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # SQLite pool, filters, repositories
//! ├── services/      # image storage
//! └── utils/         # error bridge, logger, validation, time
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ErrorBody, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - supports tracing format specifiers
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
