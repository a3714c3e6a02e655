//! Course and enrollment storage.

pub mod ids;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Course, CourseFields, CourseId, Enrollment, EnrollmentId, NewEnrollment, PaymentStatus};

pub use ids::IdAllocator;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Reads of a missing id return `Ok(None)`; mutations return `AppError::NotFound`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_course(&self, fields: CourseFields) -> Result<CourseId, AppError>;

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, AppError>;

    async fn list_courses(&self) -> Result<Vec<Course>, AppError>;

    async fn update_course(&self, id: CourseId, fields: CourseFields) -> Result<(), AppError>;

    async fn delete_course(&self, id: CourseId) -> Result<(), AppError>;

    async fn create_enrollment(&self, req: NewEnrollment) -> Result<EnrollmentId, AppError>;

    async fn get_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>, AppError>;

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, AppError>;

    async fn list_enrollments_by_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<Enrollment>, AppError> {
        let enrollments = self.list_enrollments().await?;
        Ok(enrollments
            .into_iter()
            .filter(|e| e.course_id == course_id)
            .collect())
    }

    async fn list_enrollments_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<Enrollment>, AppError> {
        let enrollments = self.list_enrollments().await?;
        Ok(enrollments
            .into_iter()
            .filter(|e| e.payment_status == status)
            .collect())
    }

    /// Idempotent.
    async fn mark_enrollment_paid(&self, id: EnrollmentId) -> Result<(), AppError>;

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
