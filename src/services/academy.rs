use std::sync::Arc;

use tracing::{debug, info};

use crate::error::AppError;
use crate::models::{
    Course, CourseFields, CourseId, DashboardStats, Enrollment, EnrollmentId, NewEnrollment,
    PaymentStatus,
};
use crate::store::Store;

/// The boundary every caller goes through: one method per remote procedure.
/// Validates input shape before touching the store and passes store errors
/// through unchanged.
#[derive(Clone)]
pub struct AcademyService {
    store: Arc<dyn Store>,
}

impl AcademyService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn health(&self) -> Result<(), AppError> {
        self.store.ping().await
    }

    pub async fn create_course(&self, fields: CourseFields) -> Result<CourseId, AppError> {
        fields.validate()?;
        let id = self.store.create_course(fields).await?;
        info!(course_id = id, "course created");
        Ok(id)
    }

    pub async fn update_course(&self, id: CourseId, fields: CourseFields) -> Result<(), AppError> {
        fields.validate()?;
        self.store.update_course(id, fields).await?;
        info!(course_id = id, "course updated");
        Ok(())
    }

    pub async fn delete_course(&self, id: CourseId) -> Result<(), AppError> {
        self.store.delete_course(id).await?;
        info!(course_id = id, "course deleted");
        Ok(())
    }

    pub async fn get_course(&self, id: CourseId) -> Result<Option<Course>, AppError> {
        self.store.get_course(id).await
    }

    pub async fn get_all_courses(&self) -> Result<Vec<Course>, AppError> {
        self.store.list_courses().await
    }

    pub async fn create_enrollment(&self, req: NewEnrollment) -> Result<EnrollmentId, AppError> {
        req.validate()?;
        let course_id = req.course_id;
        let id = self.store.create_enrollment(req).await?;
        info!(enrollment_id = id, course_id, "enrollment created");
        Ok(id)
    }

    pub async fn get_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>, AppError> {
        self.store.get_enrollment(id).await
    }

    pub async fn get_all_enrollments(&self) -> Result<Vec<Enrollment>, AppError> {
        self.store.list_enrollments().await
    }

    pub async fn get_enrollments_by_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<Enrollment>, AppError> {
        self.store.list_enrollments_by_course(course_id).await
    }

    pub async fn get_enrollments_by_status(
        &self,
        status: PaymentStatus,
    ) -> Result<Vec<Enrollment>, AppError> {
        self.store.list_enrollments_by_status(status).await
    }

    pub async fn mark_enrollment_paid(&self, id: EnrollmentId) -> Result<(), AppError> {
        self.store.mark_enrollment_paid(id).await?;
        info!(enrollment_id = id, "enrollment marked paid");
        Ok(())
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        let courses = self.store.list_courses().await?;
        let enrollments = self.store.list_enrollments().await?;
        let stats = DashboardStats::from_records(&courses, &enrollments);
        debug!("dashboard stats: {:?}", stats);
        Ok(stats)
    }
}
