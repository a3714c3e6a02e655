use serde::{Deserialize, Serialize};

use crate::models::{Course, Enrollment, PaymentStatus};

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_courses: usize,
    pub total_enrollments: usize,
    pub pending_payments: usize,
    pub paid_enrollments: usize,
}

impl DashboardStats {
    pub fn from_records(courses: &[Course], enrollments: &[Enrollment]) -> Self {
        let paid_enrollments = enrollments
            .iter()
            .filter(|e| e.payment_status == PaymentStatus::Paid)
            .count();

        Self {
            total_courses: courses.len(),
            total_enrollments: enrollments.len(),
            pending_payments: enrollments.len() - paid_enrollments,
            paid_enrollments,
        }
    }
}
