//! Contact form route handlers.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::Value;
use tracing::instrument;

use super::{ApiResponse, read_payload};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::NewContact;
use crate::state::AppState;

/// Shown after a contact message is stored.
pub const CONTACT_SUCCESS: &str = "Thank you! We'll get back to you within 24 hours.";

/// Shown when the contact message could not be stored.
pub const CONTACT_FAILURE: &str = "Failed to submit contact form. Please try again.";

/// Submit a contact message.
///
/// POST /api/contact
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    let payload = read_payload(payload)?;
    let new = NewContact::from_payload(&payload)?;

    let contact = state
        .store()
        .create_contact(new)
        .map_err(|e| AppError::from_store(e, CONTACT_FAILURE))?;

    let id = contact.id.to_string();
    tracing::info!(contact_id = %id, newsletter = contact.newsletter, "Contact message stored");
    add_breadcrumb(
        "form",
        "Contact message stored",
        Some(&[("contact_id", id.as_str())]),
    );

    Ok(Json(ApiResponse::ok(CONTACT_SUCCESS)))
}
