// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::services::email::Mailer;

/// Application state containing database pool, services, and configuration.
///
/// Immutable after startup; per-request identity travels in request
/// extractors, never through this struct.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
}
