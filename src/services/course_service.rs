use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::db::repository::CourseRepository;
use crate::error::AppError;
use crate::models::{CareerStats, Course, CourseRequest, CourseStatus};

/// Business rules over course records: code uniqueness, existence checks
/// and per-career statistics. Reads are plain pass-throughs.
#[derive(Clone)]
pub struct CourseService {
    repo: Arc<dyn CourseRepository>,
}

impl CourseService {
    pub fn new(repo: Arc<dyn CourseRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self) -> Result<Vec<Course>, AppError> {
        Ok(self.repo.find_all().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Course>, AppError> {
        Ok(self.repo.find_by_id(id).await?)
    }

    pub async fn get_by_code(&self, code: &str) -> Result<Option<Course>, AppError> {
        Ok(self.repo.find_by_code(code).await?)
    }

    pub async fn create(&self, req: CourseRequest) -> Result<Course, AppError> {
        let fields = req.validate().map_err(AppError::Validation)?;

        if self.repo.exists_by_code(&fields.code).await? {
            warn!("Rejected course with duplicate code: {}", fields.code);
            return Err(AppError::DuplicateCode(fields.code));
        }

        let course = self
            .repo
            .insert(&fields, Utc::now())
            .await
            .map_err(|e| duplicate_or_database(e, &fields.code))?;

        info!("Created course {} ({})", course.id, course.code);
        Ok(course)
    }

    /// Replaces every mutable field of course `id`.
    pub async fn update(&self, id: i64, req: CourseRequest) -> Result<Course, AppError> {
        let fields = req.validate().map_err(AppError::Validation)?;

        let course = self
            .repo
            .update(id, &fields, Utc::now())
            .await
            .map_err(|e| duplicate_or_database(e, &fields.code))?
            .ok_or(AppError::NotFound)?;

        info!("Updated course {} ({})", course.id, course.code);
        Ok(course)
    }

    /// Hard delete. Returns the removed id.
    pub async fn delete(&self, id: i64) -> Result<i64, AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound);
        }

        info!("Deleted course {}", id);
        Ok(id)
    }

    pub async fn get_by_career(&self, career_id: i64) -> Result<Vec<Course>, AppError> {
        Ok(self.repo.find_by_career(career_id).await?)
    }

    pub async fn get_by_semester(&self, semester: i32) -> Result<Vec<Course>, AppError> {
        Ok(self.repo.find_by_semester(semester).await?)
    }

    pub async fn get_active(&self) -> Result<Vec<Course>, AppError> {
        Ok(self.repo.find_by_status(CourseStatus::Active).await?)
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Course>, AppError> {
        Ok(self.repo.search_by_name(name).await?)
    }

    pub async fn get_by_career_and_semester(
        &self,
        career_id: i64,
        semester: i32,
    ) -> Result<Vec<Course>, AppError> {
        Ok(self
            .repo
            .find_by_career_and_semester(career_id, semester)
            .await?)
    }

    pub async fn statistics(&self, career_id: i64) -> Result<CareerStats, AppError> {
        let active_count = self.repo.count_active_by_career(career_id).await?;
        let total_credits = self
            .repo
            .sum_active_credits_by_career(career_id)
            .await?
            .unwrap_or(0);

        Ok(CareerStats {
            career_id,
            active_count,
            total_credits,
        })
    }
}

/// A unique violation can only come from `courses.code`.
fn duplicate_or_database(err: sqlx::Error, code: &str) -> AppError {
    let is_unique = err
        .as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false);

    if is_unique {
        warn!("Unique constraint rejected course code: {}", code);
        AppError::DuplicateCode(code.to_string())
    } else {
        AppError::Database(err)
    }
}
