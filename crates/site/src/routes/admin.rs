//! Admin listing route handlers.
//!
//! Every handler here requires admin credentials via [`RequireAdmin`]; the
//! submissions contain personal data.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Contact, CourseEnrollment, JobApplication, NewsletterSubscriber};
use crate::state::AppState;

/// List contact messages, newest first.
///
/// GET /api/contacts
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn list_contacts(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Contact>>> {
    state
        .store()
        .list_contacts()
        .map(Json)
        .map_err(|e| AppError::from_store(e, "Failed to fetch contacts"))
}

/// List newsletter subscribers, newest first.
///
/// GET /api/newsletters
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn list_newsletter_subscribers(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<NewsletterSubscriber>>> {
    state
        .store()
        .list_newsletter_subscriptions()
        .map(Json)
        .map_err(|e| AppError::from_store(e, "Failed to fetch newsletters"))
}

/// List job applications, newest first.
///
/// GET /api/job-applications
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn list_job_applications(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<JobApplication>>> {
    state
        .store()
        .list_job_applications()
        .map(Json)
        .map_err(|e| AppError::from_store(e, "Failed to fetch job applications"))
}

/// List course enrollments, newest first.
///
/// GET /api/course-enrollments
#[instrument(skip_all, fields(admin = %admin.username))]
pub async fn list_course_enrollments(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseEnrollment>>> {
    state
        .store()
        .list_course_enrollments()
        .map(Json)
        .map_err(|e| AppError::from_store(e, "Failed to fetch course enrollments"))
}
