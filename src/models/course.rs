use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::MAX_STORED_INTEGER;

pub type CourseId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub syllabus: Vec<String>,
    pub trainer_name: String,
    pub trainer_bio: String,
    pub batch_timings: String,
    pub fees: u64,
    pub zoom_link: String,
}

/// Every editable field of a course. Used both to create a course and to
/// replace all fields of an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFields {
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    #[serde(default)]
    pub syllabus: Vec<String>,
    pub trainer_name: String,
    #[serde(default)]
    pub trainer_bio: String,
    pub batch_timings: String,
    pub fees: u64,
    #[serde(default)]
    pub zoom_link: String,
}

impl Course {
    pub fn from_fields(id: CourseId, fields: CourseFields) -> Self {
        Self {
            id,
            title: fields.title,
            short_description: fields.short_description,
            full_description: fields.full_description,
            syllabus: fields.syllabus,
            trainer_name: fields.trainer_name,
            trainer_bio: fields.trainer_bio,
            batch_timings: fields.batch_timings,
            fees: fields.fees,
            zoom_link: fields.zoom_link,
        }
    }

    pub fn to_fields(&self) -> CourseFields {
        CourseFields {
            title: self.title.clone(),
            short_description: self.short_description.clone(),
            full_description: self.full_description.clone(),
            syllabus: self.syllabus.clone(),
            trainer_name: self.trainer_name.clone(),
            trainer_bio: self.trainer_bio.clone(),
            batch_timings: self.batch_timings.clone(),
            fees: self.fees,
            zoom_link: self.zoom_link.clone(),
        }
    }

    /// Overwrites every field except the id.
    pub fn replace_fields(&mut self, fields: CourseFields) {
        *self = Course::from_fields(self.id, fields);
    }
}

impl CourseFields {
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("title", &self.title),
            ("shortDescription", &self.short_description),
            ("fullDescription", &self.full_description),
            ("trainerName", &self.trainer_name),
            ("batchTimings", &self.batch_timings),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "required fields are blank: {}",
                missing.join(", ")
            )));
        }
        if self.fees > MAX_STORED_INTEGER {
            return Err(AppError::InvalidInput(format!(
                "fees must not exceed {}",
                MAX_STORED_INTEGER
            )));
        }
        Ok(())
    }
}
