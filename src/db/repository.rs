use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{Course, CourseFields, CourseStatus};

const COURSE_COLUMNS: &str = "id, code, name, description, credits, theoretical_hours, \
     practical_hours, career_id, semester, status, created_at, updated_at";

/// Query primitives over the `courses` table.
///
/// Multi-row results are ordered by id.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Course>, sqlx::Error>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Course>, sqlx::Error>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Course>, sqlx::Error>;
    async fn find_by_career(&self, career_id: i64) -> Result<Vec<Course>, sqlx::Error>;
    async fn find_by_semester(&self, semester: i32) -> Result<Vec<Course>, sqlx::Error>;
    async fn find_by_status(&self, status: CourseStatus) -> Result<Vec<Course>, sqlx::Error>;
    async fn find_by_career_and_semester(
        &self,
        career_id: i64,
        semester: i32,
    ) -> Result<Vec<Course>, sqlx::Error>;
    /// Case-insensitive substring match on the name.
    async fn search_by_name(&self, name: &str) -> Result<Vec<Course>, sqlx::Error>;
    async fn exists_by_code(&self, code: &str) -> Result<bool, sqlx::Error>;
    async fn count_active_by_career(&self, career_id: i64) -> Result<i64, sqlx::Error>;
    /// `None` when the career has no active course.
    async fn sum_active_credits_by_career(&self, career_id: i64)
    -> Result<Option<i64>, sqlx::Error>;
    async fn insert(&self, fields: &CourseFields, now: DateTime<Utc>)
    -> Result<Course, sqlx::Error>;
    /// `None` when no course has this id.
    async fn update(
        &self,
        id: i64,
        fields: &CourseFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Course>, sqlx::Error>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error>;
}

#[derive(Clone)]
pub struct SqliteCourseRepository {
    db: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn find_all(&self) -> Result<Vec<Course>, sqlx::Error> {
        let sql = format!("SELECT {} FROM courses ORDER BY id", COURSE_COLUMNS);
        sqlx::query_as::<_, Course>(&sql).fetch_all(&self.db).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Course>, sqlx::Error> {
        let sql = format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS);
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Course>, sqlx::Error> {
        let sql = format!("SELECT {} FROM courses WHERE code = ?", COURSE_COLUMNS);
        sqlx::query_as::<_, Course>(&sql)
            .bind(code)
            .fetch_optional(&self.db)
            .await
    }

    async fn find_by_career(&self, career_id: i64) -> Result<Vec<Course>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM courses WHERE career_id = ? ORDER BY id",
            COURSE_COLUMNS
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(career_id)
            .fetch_all(&self.db)
            .await
    }

    async fn find_by_semester(&self, semester: i32) -> Result<Vec<Course>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM courses WHERE semester = ? ORDER BY id",
            COURSE_COLUMNS
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(semester)
            .fetch_all(&self.db)
            .await
    }

    async fn find_by_status(&self, status: CourseStatus) -> Result<Vec<Course>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM courses WHERE status = ? ORDER BY id",
            COURSE_COLUMNS
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(status)
            .fetch_all(&self.db)
            .await
    }

    async fn find_by_career_and_semester(
        &self,
        career_id: i64,
        semester: i32,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM courses WHERE career_id = ? AND semester = ? ORDER BY id",
            COURSE_COLUMNS
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(career_id)
            .bind(semester)
            .fetch_all(&self.db)
            .await
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<Course>, sqlx::Error> {
        // SQLite's LOWER and LIKE only fold ASCII, so matching happens here.
        let needle = name.to_lowercase();
        let courses = self.find_all().await?;

        Ok(courses
            .into_iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses WHERE code = ?")
            .bind(code)
            .fetch_one(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn count_active_by_career(&self, career_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM courses WHERE career_id = ? AND status = 'active'",
        )
        .bind(career_id)
        .fetch_one(&self.db)
        .await
    }

    async fn sum_active_credits_by_career(
        &self,
        career_id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<i64>>(
            "SELECT SUM(credits) FROM courses WHERE career_id = ? AND status = 'active'",
        )
        .bind(career_id)
        .fetch_one(&self.db)
        .await
    }

    async fn insert(
        &self,
        fields: &CourseFields,
        now: DateTime<Utc>,
    ) -> Result<Course, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO courses
                (code, name, description, credits, theoretical_hours, practical_hours,
                career_id, semester, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            COURSE_COLUMNS
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(&fields.code)
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.credits)
            .bind(fields.theoretical_hours)
            .bind(fields.practical_hours)
            .bind(fields.career_id)
            .bind(fields.semester)
            .bind(fields.status)
            .bind(now)
            .bind(now)
            .fetch_one(&self.db)
            .await
    }

    async fn update(
        &self,
        id: i64,
        fields: &CourseFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Course>, sqlx::Error> {
        // created_at is left untouched.
        let sql = format!(
            r#"
            UPDATE courses
            SET code = ?,
                name = ?,
                description = ?,
                credits = ?,
                theoretical_hours = ?,
                practical_hours = ?,
                career_id = ?,
                semester = ?,
                status = ?,
                updated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            COURSE_COLUMNS
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(&fields.code)
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.credits)
            .bind(fields.theoretical_hours)
            .bind(fields.practical_hours)
            .bind(fields.career_id)
            .bind(fields.semester)
            .bind(fields.status)
            .bind(now)
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        Ok(result > 0)
    }
}
