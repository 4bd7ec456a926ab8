use std::path::PathBuf;

use crate::auth::{CookieConfig, JwtConfig};
use crate::core::Result;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | data root |
/// | DATABASE_PATH | {WORK_DIR}/inventory.db | SQLite file |
/// | UPLOADS_DIR | {WORK_DIR}/uploads/images | image store |
/// | HTTP_PORT | 4000 | HTTP port |
/// | ENVIRONMENT | development | development / production |
/// | CORS_ORIGIN | http://localhost:5173 | allowed browser origin |
/// | COOKIE_SAME_SITE / COOKIE_SECURE | lax / unset | session cookie attributes |
/// | TIMEZONE | Asia/Seoul | statistics month boundaries |
/// | LOG_LEVEL | info | log filter when RUST_LOG is unset |
/// | LOG_DIR | unset | daily rolling log files |
///
/// JWT settings are read by [`JwtConfig::from_env`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Data root
    pub work_dir: String,
    /// SQLite database file
    pub database_path: String,
    /// Stored images
    pub uploads_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// development | production
    pub environment: String,
    /// Browser origin allowed to send credentials
    pub cors_origin: String,
    /// Business time zone (IANA name)
    pub timezone: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Fails only when the JWT secret is unusable.
    pub fn from_env() -> Result<Self> {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let base = PathBuf::from(&work_dir);
        let jwt = JwtConfig::from_env().map_err(|e| crate::core::ServerError::Config(e.to_string()))?;

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
                base.join("inventory.db").to_string_lossy().into_owned()
            }),
            uploads_dir: std::env::var("UPLOADS_DIR").unwrap_or_else(|_| {
                base.join("uploads").join("images").to_string_lossy().into_owned()
            }),
            work_dir,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            timezone: std::env::var("TIMEZONE").unwrap_or_else(|_| "Asia/Seoul".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            jwt,
            cookie: CookieConfig::from_env(),
        })
    }

    /// Configuration rooted at `work_dir` with fixed defaults
    ///
    /// Ignores the environment. Used by tests.
    pub fn for_work_dir(work_dir: impl Into<PathBuf>, jwt: JwtConfig) -> Self {
        let base: PathBuf = work_dir.into();
        Self {
            work_dir: base.to_string_lossy().into_owned(),
            database_path: base.join("inventory.db").to_string_lossy().into_owned(),
            uploads_dir: base.join("uploads").join("images").to_string_lossy().into_owned(),
            http_port: 4000,
            environment: "development".into(),
            cors_origin: "http://localhost:5173".into(),
            timezone: "Asia/Seoul".into(),
            log_level: "info".into(),
            log_dir: None,
            jwt,
            cookie: CookieConfig::default(),
        }
    }

    /// Is production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Is development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
