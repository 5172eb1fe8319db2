//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server faults to Sentry
//! before responding to the client. Every failure is rendered as the same
//! JSON envelope the success path uses, `{success: false, message, [errors]}`.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::routes::ApiResponse;
use crate::store::StoreError;
use crate::validation::ValidationErrors;

/// Message for the newsletter endpoint's validation failures.
pub const NEWSLETTER_INVALID_EMAIL: &str = "Please enter a valid email address.";

/// Message for a duplicate newsletter subscription.
pub const NEWSLETTER_DUPLICATE: &str = "This email is already subscribed to our newsletter.";

/// Realm advertised on 401 responses.
pub const ADMIN_REALM: &str = "Basic realm=\"codevente-admin\"";

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more field constraints were violated.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The newsletter email was malformed. Reported without field detail.
    #[error("Invalid newsletter email: {0}")]
    InvalidNewsletterEmail(ValidationErrors),

    /// The newsletter email is already subscribed.
    #[error("Email already subscribed to newsletter")]
    DuplicateSubscriber,

    /// The store failed. `message` is the endpoint's public failure message.
    #[error("Store error: {source}")]
    Store {
        source: StoreError,
        message: &'static str,
    },

    /// Missing or wrong admin credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Map a store failure, keeping duplicate subscriptions distinguishable.
    ///
    /// `message` is what the client sees if the failure is a fault.
    #[must_use]
    pub fn from_store(source: StoreError, message: &'static str) -> Self {
        match source {
            StoreError::DuplicateSubscriber => Self::DuplicateSubscriber,
            source => Self::Store { source, message },
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidNewsletterEmail(_) | Self::DuplicateSubscriber => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Store { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Store { .. } | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let body = match self {
            Self::Validation(errors) => {
                tracing::info!(violations = errors.errors().len(), "Submission rejected");
                ApiResponse::invalid(errors.into_errors())
            }
            Self::InvalidNewsletterEmail(_) => ApiResponse::failure(NEWSLETTER_INVALID_EMAIL),
            Self::DuplicateSubscriber => ApiResponse::failure(NEWSLETTER_DUPLICATE),
            Self::Store { message, .. } => ApiResponse::failure(message),
            Self::Unauthorized => ApiResponse::failure("Authentication required"),
            Self::Internal(_) => ApiResponse::failure("Internal server error"),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(ADMIN_REALM));
        }
        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for a form submission.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of
/// submissions leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Internal("boom".to_string());
        assert_eq!(err.to_string(), "Internal error: boom");
    }

    #[test]
    fn test_from_store_keeps_duplicates_distinct() {
        let err = AppError::from_store(StoreError::DuplicateSubscriber, "Failed");
        assert!(matches!(err, AppError::DuplicateSubscriber));

        let err = AppError::from_store(StoreError::Poisoned("contacts"), "Failed");
        assert!(matches!(err, AppError::Store { .. }));
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Validation(ValidationErrors::single("name", "Required")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DuplicateSubscriber.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Internal("test".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_envelope_lists_errors() {
        let (status, body) = body_json(AppError::Validation(ValidationErrors::single(
            "name",
            "Name is required",
        )))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"][0]["field"], "name");
        assert_eq!(body["errors"][0]["message"], "Name is required");
    }

    #[tokio::test]
    async fn test_store_fault_hides_cause() {
        let (status, body) = body_json(AppError::from_store(
            StoreError::Poisoned("contacts"),
            "Failed to submit contact form. Please try again.",
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["message"],
            "Failed to submit contact form. Please try again."
        );
        assert!(body.get("errors").is_none());
        assert!(!body.to_string().contains("poisoned"));
    }

    #[tokio::test]
    async fn test_unauthorized_sets_challenge_header() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            ADMIN_REALM
        );
    }
}
