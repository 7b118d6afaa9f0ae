use std::sync::Arc;

use crate::config::ServerConfig;
use crate::render::Templates;
use crate::session::SessionKey;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: folio_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Signing key for the session cookie.
    pub session_key: Arc<SessionKey>,
    /// HTML template environment.
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(pool: folio_db::DbPool, config: ServerConfig) -> Self {
        let session_key = Arc::new(SessionKey::new(&config.session_secret));
        let templates = Arc::new(Templates::from_dir(&config.template_dir));
        Self {
            pool,
            config: Arc::new(config),
            session_key,
            templates,
        }
    }
}
