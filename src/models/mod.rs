pub mod course;
pub mod enrollment;
pub mod stats;

pub use course::{Course, CourseFields, CourseId};
pub use enrollment::{Enrollment, EnrollmentId, NewEnrollment, PaymentStatus};
pub use stats::DashboardStats;

/// Largest id or amount every store can hold (SQLite integers are signed).
pub const MAX_STORED_INTEGER: u64 = i64::MAX as u64;
