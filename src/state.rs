use sqlx::SqlitePool;
use std::sync::Arc;

use crate::repo::{RecordRepository, TagRepository};

#[derive(Clone)]
pub struct AppState {
    pub tags: TagRepository,
    pub records: RecordRepository,
    pub pool: Arc<SqlitePool>,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let pool = Arc::new(pool);
        Self {
            tags: TagRepository::new(pool.clone()),
            records: RecordRepository::new(pool.clone()),
            pool,
        }
    }
}
