//! Course enrollments submitted from the courses page.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use codevente_core::{Email, EnrollmentId};

use crate::validation::{FieldRule, Schema, ValidationErrors, validate};

/// Field rules for `POST /api/course-enrollments`.
pub const COURSE_ENROLLMENT_SCHEMA: Schema = &[
    FieldRule::text("firstName", 1, "First name is required"),
    FieldRule::text("lastName", 1, "Last name is required"),
    FieldRule::email("email"),
    FieldRule::optional_text("phone"),
    FieldRule::text("courseId", 1, "Course selection is required"),
    FieldRule::text("courseName", 1, "Course name is required"),
    FieldRule::text("experience", 1, "Experience level is required"),
    FieldRule::text(
        "goals",
        20,
        "Please describe your learning goals (minimum 20 characters)",
    ),
    FieldRule::optional_text("heardAbout"),
    FieldRule::flag("newsletter"),
];

/// A validated course enrollment, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourseEnrollment {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub course_id: String,
    pub course_name: String,
    pub experience: String,
    pub goals: String,
    pub heard_about: Option<String>,
    pub newsletter: bool,
}

impl NewCourseEnrollment {
    /// Validate a raw course enrollment payload.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = validate(COURSE_ENROLLMENT_SCHEMA, payload)?;

        Ok(Self {
            first_name: fields.text("firstName")?,
            last_name: fields.text("lastName")?,
            email: fields.email("email")?,
            phone: fields.optional_text("phone"),
            course_id: fields.text("courseId")?,
            course_name: fields.text("courseName")?,
            experience: fields.text("experience")?,
            goals: fields.text("goals")?,
            heard_about: fields.optional_text("heardAbout"),
            newsletter: fields.flag("newsletter"),
        })
    }
}

/// A stored course enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEnrollment {
    pub id: EnrollmentId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub course_id: String,
    pub course_name: String,
    pub experience: String,
    pub goals: String,
    pub heard_about: Option<String>,
    pub newsletter: bool,
    pub created_at: DateTime<Utc>,
}

impl CourseEnrollment {
    pub(crate) fn new(id: EnrollmentId, created_at: DateTime<Utc>, new: NewCourseEnrollment) -> Self {
        Self {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            course_id: new.course_id,
            course_name: new.course_name,
            experience: new.experience,
            goals: new.goals,
            heard_about: new.heard_about,
            newsletter: new.newsletter,
            created_at,
        }
    }
}
