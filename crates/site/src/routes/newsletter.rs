//! Newsletter subscription route handlers.
//!
//! Unlike the other forms, a rejected signup is reported with a single
//! human-readable message instead of a field list, and an address that is
//! already subscribed gets its own message.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::Value;
use tracing::instrument;

use super::{ApiResponse, read_payload};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::NewNewsletterSubscriber;
use crate::state::AppState;

/// Shown after a subscriber is stored.
pub const NEWSLETTER_SUCCESS: &str = "Successfully subscribed to newsletter!";

/// Shown when the subscription could not be stored.
pub const NEWSLETTER_FAILURE: &str = "Failed to subscribe. Please try again.";

/// Subscribe to the newsletter.
///
/// POST /api/newsletter
#[instrument(skip_all)]
pub async fn subscribe(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse>> {
    let new = read_payload(payload)
        .and_then(|payload| NewNewsletterSubscriber::from_payload(&payload))
        .map_err(AppError::InvalidNewsletterEmail)?;

    let subscriber = state
        .store()
        .create_newsletter_subscription(new)
        .map_err(|e| AppError::from_store(e, NEWSLETTER_FAILURE))
        .inspect_err(|e| {
            if matches!(e, AppError::DuplicateSubscriber) {
                tracing::info!("Newsletter email already subscribed");
            }
        })?;

    let id = subscriber.id.to_string();
    tracing::info!(subscriber_id = %id, "Newsletter subscription stored");
    add_breadcrumb(
        "form",
        "Newsletter subscription stored",
        Some(&[("subscriber_id", id.as_str())]),
    );

    Ok(Json(ApiResponse::ok(NEWSLETTER_SUCCESS)))
}
