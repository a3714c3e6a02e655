use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::error::AppError;
use crate::models::{Course, CourseFields, CourseId, Enrollment, EnrollmentId, NewEnrollment, PaymentStatus};

const COURSE_COLUMNS: &str = "id, title, short_description, full_description, syllabus, \
    trainer_name, trainer_bio, batch_timings, fees, zoom_link";

const ENROLLMENT_COLUMNS: &str =
    "id, student_name, email, phone_number, course_id, timestamp, payment_status";

#[derive(Debug, FromRow)]
struct CourseRow {
    id: i64,
    title: String,
    short_description: String,
    full_description: String,
    syllabus: String,
    trainer_name: String,
    trainer_bio: String,
    batch_timings: String,
    fees: i64,
    zoom_link: String,
}

impl TryFrom<CourseRow> for Course {
    type Error = AppError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let syllabus: Vec<String> = serde_json::from_str(&row.syllabus)
            .map_err(|e| AppError::Internal(format!("corrupt syllabus for course {}: {}", row.id, e)))?;

        Ok(Course {
            id: from_db_int(row.id, "courses.id")?,
            title: row.title,
            short_description: row.short_description,
            full_description: row.full_description,
            syllabus,
            trainer_name: row.trainer_name,
            trainer_bio: row.trainer_bio,
            batch_timings: row.batch_timings,
            fees: from_db_int(row.fees, "courses.fees")?,
            zoom_link: row.zoom_link,
        })
    }
}

#[derive(Debug, FromRow)]
struct EnrollmentRow {
    id: i64,
    student_name: String,
    email: String,
    phone_number: String,
    course_id: i64,
    timestamp: DateTime<Utc>,
    payment_status: String,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = AppError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        Ok(Enrollment {
            id: from_db_int(row.id, "enrollments.id")?,
            student_name: row.student_name,
            email: row.email,
            phone_number: row.phone_number,
            course_id: from_db_int(row.course_id, "enrollments.course_id")?,
            timestamp: row.timestamp,
            payment_status: row.payment_status.parse()?,
        })
    }
}

fn from_db_int(value: i64, column: &str) -> Result<u64, AppError> {
    u64::try_from(value)
        .map_err(|_| AppError::Internal(format!("negative value {} in {}", value, column)))
}

fn to_db_int(value: u64, field: &str) -> Result<i64, AppError> {
    i64::try_from(value)
        .map_err(|_| AppError::InvalidInput(format!("{} is out of range: {}", field, value)))
}

/// Ids beyond the SQLite integer range can never have been issued.
fn lookup_key(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

fn encode_syllabus(syllabus: &[String]) -> Result<String, AppError> {
    serde_json::to_string(syllabus)
        .map_err(|e| AppError::Internal(format!("failed to encode syllabus: {}", e)))
}

pub async fn ping(db: &SqlitePool) -> Result<(), AppError> {
    sqlx::query("select 1").execute(db).await?;
    Ok(())
}

pub async fn insert_course(db: &SqlitePool, fields: &CourseFields) -> Result<CourseId, AppError> {
    let syllabus = encode_syllabus(&fields.syllabus)?;
    let fees = to_db_int(fields.fees, "fees")?;

    let result = sqlx::query(
        r#"
        INSERT INTO courses
            (title, short_description, full_description, syllabus,
            trainer_name, trainer_bio, batch_timings, fees, zoom_link)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.short_description)
    .bind(&fields.full_description)
    .bind(syllabus)
    .bind(&fields.trainer_name)
    .bind(&fields.trainer_bio)
    .bind(&fields.batch_timings)
    .bind(fees)
    .bind(&fields.zoom_link)
    .execute(db)
    .await?;

    from_db_int(result.last_insert_rowid(), "courses.id")
}

pub async fn find_course_by_id(db: &SqlitePool, id: CourseId) -> Result<Option<Course>, AppError> {
    let Some(key) = lookup_key(id) else {
        return Ok(None);
    };

    let row = sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {} FROM courses WHERE id = ?",
        COURSE_COLUMNS
    ))
    .bind(key)
    .fetch_optional(db)
    .await?;

    row.map(Course::try_from).transpose()
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, AppError> {
    sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {} FROM courses ORDER BY id",
        COURSE_COLUMNS
    ))
    .fetch_all(db)
    .await?
    .into_iter()
    .map(Course::try_from)
    .collect()
}

pub async fn update_course(
    db: &SqlitePool,
    id: CourseId,
    fields: &CourseFields,
) -> Result<bool, AppError> {
    let Some(key) = lookup_key(id) else {
        return Ok(false);
    };
    let syllabus = encode_syllabus(&fields.syllabus)?;
    let fees = to_db_int(fields.fees, "fees")?;

    let result = sqlx::query(
        r#"
        UPDATE courses
        SET title = ?1,
            short_description = ?2,
            full_description = ?3,
            syllabus = ?4,
            trainer_name = ?5,
            trainer_bio = ?6,
            batch_timings = ?7,
            fees = ?8,
            zoom_link = ?9
        WHERE id = ?10
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.short_description)
    .bind(&fields.full_description)
    .bind(syllabus)
    .bind(&fields.trainer_name)
    .bind(&fields.trainer_bio)
    .bind(&fields.batch_timings)
    .bind(fees)
    .bind(&fields.zoom_link)
    .bind(key)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn delete_course(db: &SqlitePool, id: CourseId) -> Result<bool, AppError> {
    let Some(key) = lookup_key(id) else {
        return Ok(false);
    };

    let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(key)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn insert_enrollment(
    db: &SqlitePool,
    req: &NewEnrollment,
    timestamp: DateTime<Utc>,
) -> Result<EnrollmentId, AppError> {
    let course_id = to_db_int(req.course_id, "courseId")?;

    let result = sqlx::query(
        r#"
        INSERT INTO enrollments
            (student_name, email, phone_number, course_id, timestamp, payment_status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&req.student_name)
    .bind(&req.email)
    .bind(&req.phone_number)
    .bind(course_id)
    .bind(timestamp)
    .bind(PaymentStatus::Pending.as_str())
    .execute(db)
    .await?;

    from_db_int(result.last_insert_rowid(), "enrollments.id")
}

pub async fn find_enrollment_by_id(
    db: &SqlitePool,
    id: EnrollmentId,
) -> Result<Option<Enrollment>, AppError> {
    let Some(key) = lookup_key(id) else {
        return Ok(None);
    };

    let row = sqlx::query_as::<_, EnrollmentRow>(&format!(
        "SELECT {} FROM enrollments WHERE id = ?",
        ENROLLMENT_COLUMNS
    ))
    .bind(key)
    .fetch_optional(db)
    .await?;

    row.map(Enrollment::try_from).transpose()
}

pub async fn fetch_enrollments(db: &SqlitePool) -> Result<Vec<Enrollment>, AppError> {
    sqlx::query_as::<_, EnrollmentRow>(&format!(
        "SELECT {} FROM enrollments ORDER BY id",
        ENROLLMENT_COLUMNS
    ))
    .fetch_all(db)
    .await?
    .into_iter()
    .map(Enrollment::try_from)
    .collect()
}

pub async fn fetch_enrollments_by_course(
    db: &SqlitePool,
    course_id: CourseId,
) -> Result<Vec<Enrollment>, AppError> {
    let Some(key) = lookup_key(course_id) else {
        return Ok(Vec::new());
    };

    sqlx::query_as::<_, EnrollmentRow>(&format!(
        "SELECT {} FROM enrollments WHERE course_id = ? ORDER BY id",
        ENROLLMENT_COLUMNS
    ))
    .bind(key)
    .fetch_all(db)
    .await?
    .into_iter()
    .map(Enrollment::try_from)
    .collect()
}

pub async fn fetch_enrollments_by_status(
    db: &SqlitePool,
    status: PaymentStatus,
) -> Result<Vec<Enrollment>, AppError> {
    sqlx::query_as::<_, EnrollmentRow>(&format!(
        "SELECT {} FROM enrollments WHERE payment_status = ? ORDER BY id",
        ENROLLMENT_COLUMNS
    ))
    .bind(status.as_str())
    .fetch_all(db)
    .await?
    .into_iter()
    .map(Enrollment::try_from)
    .collect()
}

/// Returns false only when the enrollment does not exist; re-marking a paid
/// enrollment still matches the row.
pub async fn mark_enrollment_paid(db: &SqlitePool, id: EnrollmentId) -> Result<bool, AppError> {
    let Some(key) = lookup_key(id) else {
        return Ok(false);
    };

    let result = sqlx::query("UPDATE enrollments SET payment_status = ?1 WHERE id = ?2")
        .bind(PaymentStatus::Paid.as_str())
        .bind(key)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test db");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    fn course_fields() -> CourseFields {
        CourseFields {
            title: "Data Science with Python".to_string(),
            short_description: "Analyse data".to_string(),
            full_description: "Pandas, NumPy and friends.".to_string(),
            syllabus: vec![
                "Python basics".to_string(),
                "NumPy".to_string(),
                "Pandas".to_string(),
            ],
            trainer_name: "Meera".to_string(),
            trainer_bio: "Ten years in analytics".to_string(),
            batch_timings: "Sat-Sun 10 AM".to_string(),
            fees: 18000,
            zoom_link: "https://zoom.us/j/42".to_string(),
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
    async fn test_insert_and_fetch_course() {
        let pool = setup_test_db().await;

        let id = insert_course(&pool, &course_fields())
            .await
            .expect("Failed to insert course");
        assert_eq!(id, 1);

        let course = find_course_by_id(&pool, id)
            .await
            .expect("Failed to fetch course")
            .expect("Course not found");
        assert_eq!(course.to_fields(), course_fields());

        let courses = fetch_courses(&pool).await.expect("Failed to fetch courses");
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].id, id);
    }

    #[tokio::test]
    async fn test_update_course_replaces_syllabus() {
        let pool = setup_test_db().await;
        let id = insert_course(&pool, &course_fields()).await.unwrap();

        let mut fields = course_fields();
        fields.syllabus = vec!["Statistics".to_string()];
        fields.fees = 0;
        let updated = update_course(&pool, id, &fields).await.unwrap();
        assert!(updated);

        let course = find_course_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(course.syllabus, vec!["Statistics".to_string()]);
        assert_eq!(course.fees, 0);

        assert!(!update_course(&pool, 99, &fields).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_course_and_autoincrement() {
        let pool = setup_test_db().await;
        let first = insert_course(&pool, &course_fields()).await.unwrap();
        let second = insert_course(&pool, &course_fields()).await.unwrap();

        assert!(delete_course(&pool, second).await.unwrap());
        assert!(!delete_course(&pool, second).await.unwrap());
        assert!(find_course_by_id(&pool, second).await.unwrap().is_none());

        // AUTOINCREMENT never hands out a deleted rowid again.
        let third = insert_course(&pool, &course_fields()).await.unwrap();
        assert_eq!((first, second, third), (1, 2, 3));
    }

    #[tokio::test]
    async fn test_fees_out_of_range_rejected() {
        let pool = setup_test_db().await;
        let mut fields = course_fields();
        fields.fees = u64::MAX;

        let result = insert_course(&pool, &fields).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_insert_enrollment_is_pending() {
        let pool = setup_test_db().await;
        let now = Utc::now();

        let id = insert_enrollment(&pool, &new_enrollment(5), now)
            .await
            .expect("Failed to insert enrollment");

        let enrollment = find_enrollment_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(enrollment.payment_status, PaymentStatus::Pending);
        assert_eq!(enrollment.course_id, 5);
        assert_eq!(enrollment.timestamp.timestamp(), now.timestamp());
    }

    #[tokio::test]
    async fn test_enrollment_filters() {
        let pool = setup_test_db().await;
        let a = insert_enrollment(&pool, &new_enrollment(1), Utc::now()).await.unwrap();
        let b = insert_enrollment(&pool, &new_enrollment(2), Utc::now()).await.unwrap();
        let c = insert_enrollment(&pool, &new_enrollment(1), Utc::now()).await.unwrap();

        assert!(mark_enrollment_paid(&pool, b).await.unwrap());
        assert!(mark_enrollment_paid(&pool, b).await.unwrap());
        assert!(!mark_enrollment_paid(&pool, 42).await.unwrap());

        let by_course: Vec<u64> = fetch_enrollments_by_course(&pool, 1)
            .await
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(by_course, vec![a, c]);

        let paid: Vec<u64> = fetch_enrollments_by_status(&pool, PaymentStatus::Paid)
            .await
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(paid, vec![b]);

        let pending = fetch_enrollments_by_status(&pool, PaymentStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(fetch_enrollments(&pool).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ping() {
        let pool = setup_test_db().await;
        ping(&pool).await.expect("ping failed");
    }
}
