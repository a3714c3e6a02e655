use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{CourseId, MAX_STORED_INTEGER};

pub type EnrollmentId = u64;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

// 10-digit Indian mobile number.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid phone regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(AppError::InvalidInput(format!(
                "unknown payment status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_name: String,
    pub email: String,
    pub phone_number: String,
    pub course_id: CourseId,
    pub timestamp: DateTime<Utc>,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEnrollment {
    pub student_name: String,
    pub email: String,
    pub phone_number: String,
    pub course_id: CourseId,
}

impl Enrollment {
    /// A freshly created enrollment always starts out pending.
    pub fn new(id: EnrollmentId, req: NewEnrollment, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            student_name: req.student_name,
            email: req.email,
            phone_number: req.phone_number,
            course_id: req.course_id,
            timestamp,
            payment_status: PaymentStatus::Pending,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

impl NewEnrollment {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut problems = Vec::new();

        if self.student_name.trim().is_empty() {
            problems.push("studentName is required");
        }
        if !EMAIL_PATTERN.is_match(self.email.trim()) {
            problems.push("email must be a valid email address");
        }
        let phone: String = self
            .phone_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if !PHONE_PATTERN.is_match(&phone) {
            problems.push("phoneNumber must be a valid 10-digit mobile number");
        }
        if self.course_id > MAX_STORED_INTEGER {
            problems.push("courseId is out of range");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidInput(problems.join("; ")))
        }
    }
}
