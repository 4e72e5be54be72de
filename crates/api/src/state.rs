use std::sync::Arc;

use booking_db::store::PgSchedulingStore;

use crate::auth::jwt::TokenService;
use crate::config::ServerConfig;
use crate::engine::scheduling::SchedulingEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: booking_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Token service built from `config.jwt`.
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(pool: booking_db::DbPool, config: ServerConfig) -> Self {
        let tokens = Arc::new(TokenService::new(config.jwt.clone()));
        Self {
            pool,
            config: Arc::new(config),
            tokens,
        }
    }

    /// Scheduling engine over the shared pool.
    pub fn scheduling(&self) -> SchedulingEngine<PgSchedulingStore> {
        SchedulingEngine::new(PgSchedulingStore::new(self.pool.clone()))
    }
}
