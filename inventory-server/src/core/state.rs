use std::sync::Arc;

use chrono_tz::Tz;
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::services::ImageStore;
use crate::utils::time::parse_timezone;

/// Server state - shared references to every service
///
/// Cloned into each request; every field is cheap to clone.
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Arc<Config> | configuration (immutable) |
/// | db | SqlitePool | database pool |
/// | jwt_service | Arc<JwtService> | session tokens |
/// | images | ImageStore | stored images |
/// | timezone | Tz | business time zone |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub images: ImageStore,
    pub timezone: Tz,
}

impl ServerState {
    /// Assemble state from an open pool
    pub fn new(config: Config, db: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let images = ImageStore::new(&config.uploads_dir);
        let timezone = parse_timezone(&config.timezone);
        Self {
            config: Arc::new(config),
            db,
            jwt_service,
            images,
            timezone,
        }
    }

    /// Initialize server state
    ///
    /// 1. uploads directory
    /// 2. database (file from `DATABASE_PATH`, migrations applied)
    pub async fn initialize(config: &Config) -> Result<Self> {
        let images = ImageStore::new(&config.uploads_dir);
        images
            .ensure_dir()
            .map_err(|e| ServerError::Storage(e.message))?;

        let db_service = DbService::new(&config.database_path).await?;

        Ok(Self::new(config.clone(), db_service.pool))
    }

    /// Get the JWT service
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
