//! SQLite-backed store. Identifiers come from `AUTOINCREMENT` columns, which
//! never reuse a value even after deletes.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Course, CourseFields, CourseId, Enrollment, EnrollmentId, NewEnrollment, PaymentStatus};
use crate::store::Store;

#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    /// Expects a pool whose schema is already migrated.
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let db = crate::db::connect(database_url, max_connections).await?;
        Ok(Self::new(db))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_course(&self, fields: CourseFields) -> Result<CourseId, AppError> {
        repository::insert_course(&self.db, &fields).await
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, AppError> {
        repository::find_course_by_id(&self.db, id).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        repository::fetch_courses(&self.db).await
    }

    async fn update_course(&self, id: CourseId, fields: CourseFields) -> Result<(), AppError> {
        if repository::update_course(&self.db, id, &fields).await? {
            Ok(())
        } else {
            Err(AppError::course_not_found(id))
        }
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), AppError> {
        if repository::delete_course(&self.db, id).await? {
            Ok(())
        } else {
            Err(AppError::course_not_found(id))
        }
    }

    async fn create_enrollment(&self, req: NewEnrollment) -> Result<EnrollmentId, AppError> {
        repository::insert_enrollment(&self.db, &req, Utc::now()).await
    }

    async fn get_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>, AppError> {
        repository::find_enrollment_by_id(&self.db, id).await
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, AppError> {
        repository::fetch_enrollments(&self.db).await
    }

    async fn list_enrollments_by_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<Enrollment>, AppError> {
        repository::fetch_enrollments_by_course(&self.db, course_id).await
    }

    async fn list_enrollments_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<Enrollment>, AppError> {
        repository::fetch_enrollments_by_status(&self.db, status).await
    }

    async fn mark_enrollment_paid(&self, id: EnrollmentId) -> Result<(), AppError> {
        if repository::mark_enrollment_paid(&self.db, id).await? {
            Ok(())
        } else {
            Err(AppError::enrollment_not_found(id))
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.db.is_closed() {
            return Err(AppError::Unavailable("database pool is closed".to_string()));
        }
        repository::ping(&self.db).await
    }
}
