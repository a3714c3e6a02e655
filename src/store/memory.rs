//! In-memory store used when no database is configured.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::AppError;
use crate::models::{Course, CourseFields, CourseId, Enrollment, EnrollmentId, NewEnrollment, PaymentStatus};
use crate::store::{IdAllocator, Store};

#[derive(Debug, Default)]
struct Tables {
    // Keys come from monotonic allocators, so key order is insertion order.
    courses: BTreeMap<CourseId, Course>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    course_ids: IdAllocator,
    enrollment_ids: IdAllocator,
}

/// Point-in-time copy of a [`MemoryStore`], including the allocator
/// positions so that restored stores never reissue a deleted id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub courses: Vec<Course>,
    pub enrollments: Vec<Enrollment>,
    pub last_course_id: Option<CourseId>,
    pub last_enrollment_id: Option<EnrollmentId>,
}

/// Clones share the same underlying tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let max_course = snapshot.courses.iter().map(|c| c.id).max();
        let max_enrollment = snapshot.enrollments.iter().map(|e| e.id).max();

        let tables = Tables {
            courses: snapshot.courses.into_iter().map(|c| (c.id, c)).collect(),
            enrollments: snapshot
                .enrollments
                .into_iter()
                .map(|e| (e.id, e))
                .collect(),
            course_ids: IdAllocator::starting_after(
                snapshot.last_course_id.max(max_course).unwrap_or(0),
            ),
            enrollment_ids: IdAllocator::starting_after(
                snapshot.last_enrollment_id.max(max_enrollment).unwrap_or(0),
            ),
        };

        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    pub fn snapshot(&self) -> Result<Snapshot, AppError> {
        let tables = self.read()?;
        Ok(Snapshot {
            courses: tables.courses.values().cloned().collect(),
            enrollments: tables.enrollments.values().cloned().collect(),
            last_course_id: tables.course_ids.last_issued(),
            last_enrollment_id: tables.enrollment_ids.last_issued(),
        })
    }

    /// Restores the store saved at `path`, or starts empty when no file exists.
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let raw = match fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no snapshot at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = serde_json::from_slice(&raw)?;
        info!(
            "restored {} courses and {} enrollments from {}",
            snapshot.courses.len(),
            snapshot.enrollments.len(),
            path.display()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Writes the current state to `path`, replacing any earlier snapshot.
    pub async fn save(&self, path: &Path) -> Result<(), AppError> {
        let raw = serde_json::to_vec_pretty(&self.snapshot()?)?;

        // Readers only ever see a complete file.
        let staging = path.with_extension("tmp");
        fs::write(&staging, raw).await?;
        fs::rename(&staging, path).await?;

        info!("saved snapshot to {}", path.display());
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|e| AppError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|e| AppError::Internal(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_course(&self, fields: CourseFields) -> Result<CourseId, AppError> {
        let mut tables = self.write()?;
        let id = tables.course_ids.next()?;
        tables.courses.insert(id, Course::from_fields(id, fields));
        Ok(id)
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<Course>, AppError> {
        Ok(self.read()?.courses.get(&id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(self.read()?.courses.values().cloned().collect())
    }

    async fn update_course(&self, id: CourseId, fields: CourseFields) -> Result<(), AppError> {
        let mut tables = self.write()?;
        let course = tables
            .courses
            .get_mut(&id)
            .ok_or_else(|| AppError::course_not_found(id))?;
        course.replace_fields(fields);
        Ok(())
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), AppError> {
        self.write()?
            .courses
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::course_not_found(id))
    }

    async fn create_enrollment(&self, req: NewEnrollment) -> Result<EnrollmentId, AppError> {
        let mut tables = self.write()?;
        let id = tables.enrollment_ids.next()?;
        tables
            .enrollments
            .insert(id, Enrollment::new(id, req, Utc::now()));
        Ok(id)
    }

    async fn get_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>, AppError> {
        Ok(self.read()?.enrollments.get(&id).cloned())
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, AppError> {
        Ok(self.read()?.enrollments.values().cloned().collect())
    }

    async fn mark_enrollment_paid(&self, id: EnrollmentId) -> Result<(), AppError> {
        let mut tables = self.write()?;
        let enrollment = tables
            .enrollments
            .get_mut(&id)
            .ok_or_else(|| AppError::enrollment_not_found(id))?;
        enrollment.payment_status = PaymentStatus::Paid;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course_fields(title: &str, syllabus: &[&str]) -> CourseFields {
        CourseFields {
            title: title.to_string(),
            short_description: "short".to_string(),
            full_description: "full".to_string(),
            syllabus: syllabus.iter().map(|s| s.to_string()).collect(),
            trainer_name: "Trainer".to_string(),
            trainer_bio: "Bio".to_string(),
            batch_timings: "Weekends".to_string(),
            fees: 5000,
            zoom_link: "https://zoom.us/j/1".to_string(),
        }
    }

    fn new_enrollment(course_id: CourseId) -> NewEnrollment {
        NewEnrollment {
            student_name: "Asha".to_string(),
            email: "asha@x.com".to_string(),
            phone_number: "9876543210".to_string(),
            course_id,
        }
    }

    #[tokio::test]
    async fn test_course_ids_not_reused_after_delete() {
        let store = MemoryStore::new();
        let first = store.create_course(course_fields("A", &[])).await.unwrap();
        let second = store.create_course(course_fields("B", &[])).await.unwrap();
        store.delete_course(second).await.unwrap();
        let third = store.create_course(course_fields("C", &[])).await.unwrap();

        assert_eq!((first, second, third), (1, 2, 3));
    }

    #[tokio::test]
    async fn test_course_and_enrollment_ids_are_independent() {
        let store = MemoryStore::new();
        store.create_course(course_fields("A", &[])).await.unwrap();
        store.create_course(course_fields("B", &[])).await.unwrap();
        let enrollment_id = store.create_enrollment(new_enrollment(2)).await.unwrap();

        assert_eq!(enrollment_id, 1);
    }

    #[tokio::test]
    async fn test_update_missing_course_does_not_create() {
        let store = MemoryStore::new();
        let result = store.update_course(9, course_fields("Ghost", &[])).await;

        assert!(matches!(result, Err(AppError::NotFound { entity: "course", id: 9 })));
        assert!(store.list_courses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_paid_missing_enrollment() {
        let store = MemoryStore::new();
        let result = store.mark_enrollment_paid(1).await;
        assert!(matches!(result, Err(AppError::NotFound { entity: "enrollment", .. })));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let handle = store.clone();
        let id = store.create_course(course_fields("Shared", &[])).await.unwrap();

        assert!(handle.get_course(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_snapshot_restore_keeps_allocator_position() {
        let store = MemoryStore::new();
        let kept = store.create_course(course_fields("Kept", &["a", "b"])).await.unwrap();
        let dropped = store.create_course(course_fields("Dropped", &[])).await.unwrap();
        store.delete_course(dropped).await.unwrap();
        let enrollment = store.create_enrollment(new_enrollment(kept)).await.unwrap();
        store.mark_enrollment_paid(enrollment).await.unwrap();

        let snapshot = store.snapshot().unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored = MemoryStore::from_snapshot(serde_json::from_str(&json).unwrap());

        assert_eq!(restored.snapshot().unwrap(), snapshot);
        let next = restored.create_course(course_fields("Next", &[])).await.unwrap();
        assert_eq!(next, 3);
        let paid = restored.get_enrollment(enrollment).await.unwrap().unwrap();
        assert!(paid.is_paid());
    }

    #[tokio::test]
    async fn test_load_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load(&dir.path().join("absent.json")).await.unwrap();
        assert!(store.list_courses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("academy.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(MemoryStore::load(&path).await, Err(AppError::Snapshot(_))));
    }
}
