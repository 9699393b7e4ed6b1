//! Application state management
//!
//! Author: hephaex@gmail.com

use crate::auth::{AuthService, JwtConfig};
use crate::services::{ProductService, UserService};
use catalog_core::config::{AppConfig, StorageBackend};
use catalog_core::store::{connect, ensure_schema};
use catalog_core::{
    MemoryProductStore, MemoryUserStore, PgProductStore, PgUserStore, ProductRepository,
    UserRepository,
};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Token signing configuration, derived once from `config.auth`
    pub jwt: JwtConfig,
    /// Registration and login
    pub auth: AuthService,
    /// Profile and account management
    pub users: UserService,
    /// Product catalog
    pub products: ProductService,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create state over explicit stores
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        let jwt = JwtConfig::from(&config.auth);
        Self {
            auth: AuthService::new(users.clone(), jwt.clone()),
            products: ProductService::new(products, users.clone()),
            users: UserService::new(users),
            jwt,
            config,
            start_time: Instant::now(),
        }
    }

    /// Create state backed by process-local stores
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryProductStore::new()),
        )
    }

    /// Create state for the configured storage backend
    ///
    /// For PostgreSQL this connects the pool and creates missing tables.
    pub async fn from_config(config: AppConfig) -> catalog_core::Result<Self> {
        match config.database.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory(config))
            }
            StorageBackend::Postgres => {
                let pool = connect(&config.database).await?;
                ensure_schema(&pool).await?;
                tracing::info!(
                    max_connections = config.database.max_connections,
                    "Connected to PostgreSQL"
                );
                Ok(Self::new(
                    config,
                    Arc::new(PgUserStore::from_pool(pool.clone())),
                    Arc::new(PgProductStore::from_pool(pool)),
                ))
            }
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory(AppConfig::default())
    }
}
