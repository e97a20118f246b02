use std::sync::Arc;

use crate::auth::Authenticator;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pmx_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Admin credential check used by the auth extractor.
    pub authenticator: Arc<dyn Authenticator>,
}
