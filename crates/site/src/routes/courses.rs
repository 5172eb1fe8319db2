//! Courses page route handlers.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::Value;
use tracing::instrument;

use super::{ApiResponse, read_payload};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::NewCourseEnrollment;
use crate::state::AppState;

/// Shown after an enrollment is stored.
pub const ENROLLMENT_SUCCESS: &str =
    "Enrollment received! We'll contact you with course details shortly.";

/// Shown when the enrollment could not be stored.
pub const ENROLLMENT_FAILURE: &str = "Failed to submit course enrollment. Please try again.";

/// Enroll in a course.
///
/// POST /api/course-enrollments
#[instrument(skip_all)]
pub async fn enroll(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    let payload = read_payload(payload)?;
    let new = NewCourseEnrollment::from_payload(&payload)?;

    let enrollment = state
        .store()
        .create_course_enrollment(new)
        .map_err(|e| AppError::from_store(e, ENROLLMENT_FAILURE))?;

    let id = enrollment.id.to_string();
    tracing::info!(
        enrollment_id = %id,
        course_id = %enrollment.course_id,
        "Course enrollment stored"
    );
    add_breadcrumb(
        "form",
        "Course enrollment stored",
        Some(&[("enrollment_id", id.as_str())]),
    );

    Ok(Json(ApiResponse::ok(ENROLLMENT_SUCCESS)))
}
