//! Data models
//!
//! Exchanged with the web client as camelCase JSON.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis
//! and amounts are integers in the smallest currency unit.

pub mod category;
pub mod order;
pub mod product;
pub mod statistics;
pub mod stock;
pub mod supplier;
pub mod user;

// Re-exports
pub use category::*;
pub use order::*;
pub use product::*;
pub use statistics::*;
pub use stock::*;
pub use supplier::*;
pub use user::*;
