//! Careers page route handlers.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::Value;
use tracing::instrument;

use super::{ApiResponse, read_payload};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::NewJobApplication;
use crate::state::AppState;

/// Shown after a job application is stored.
pub const APPLICATION_SUCCESS: &str =
    "Thank you for applying! We'll review your application and get back to you soon.";

/// Shown when the job application could not be stored.
pub const APPLICATION_FAILURE: &str = "Failed to submit job application. Please try again.";

/// Submit a job application.
///
/// POST /api/job-applications
///
/// Resume files are not accepted here; candidates link a portfolio or
/// `LinkedIn` profile instead.
#[instrument(skip_all)]
pub async fn apply(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    let payload = read_payload(payload)?;
    let new = NewJobApplication::from_payload(&payload)?;

    let application = state
        .store()
        .create_job_application(new)
        .map_err(|e| AppError::from_store(e, APPLICATION_FAILURE))?;

    let id = application.id.to_string();
    tracing::info!(
        application_id = %id,
        position = %application.position,
        remote = application.remote,
        "Job application stored"
    );
    add_breadcrumb(
        "form",
        "Job application stored",
        Some(&[("application_id", id.as_str())]),
    );

    Ok(Json(ApiResponse::ok(APPLICATION_SUCCESS)))
}
