//! Authentication module
//!
//! - [`JwtService`] - session token service
//! - [`CurrentUser`] - authenticated caller
//! - [`require_auth`] - authentication middleware
//! - [`cookie`] - `accesstoken` session cookie
//! - [`password`] - argon2 hashing

pub mod cookie;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use cookie::{CookieConfig, SameSite};
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
