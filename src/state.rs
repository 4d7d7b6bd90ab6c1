use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db::repository::SqliteCourseRepository;
use crate::services::CourseService;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub courses: CourseService,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        let repo = Arc::new(SqliteCourseRepository::new(db.clone()));
        Self {
            db,
            courses: CourseService::new(repo),
        }
    }
}
