use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::services::ExecutionTracker;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub executions: ExecutionTracker,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
            executions: ExecutionTracker::default(),
        }
    }
}
