use std::sync::Arc;

use sportsync_provider::SportsProvider;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sportsync_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Upstream data provider client.
    pub provider: Arc<dyn SportsProvider>,
}
