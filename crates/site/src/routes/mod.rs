//! HTTP route handlers for the form intake API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//!
//! # Submissions (public, rate limited)
//! POST /api/contact                - Contact form
//! POST /api/newsletter             - Newsletter signup
//! POST /api/job-applications       - Careers page application
//! POST /api/course-enrollments     - Courses page enrollment
//!
//! # Listings (admin, HTTP Basic)
//! GET  /api/contacts               - Contact messages, newest first
//! GET  /api/newsletters            - Newsletter subscribers, newest first
//! GET  /api/job-applications       - Job applications, newest first
//! GET  /api/course-enrollments     - Course enrollments, newest first
//! ```

pub mod admin;
pub mod careers;
pub mod contact;
pub mod courses;
pub mod newsletter;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::{HeaderValue, Method, header},
    middleware::from_fn,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{api_rate_limiter, request_id_middleware, security_headers_middleware};
use crate::state::AppState;
use crate::validation::{FieldError, ValidationErrors};

/// The JSON envelope returned by every endpoint except the listings.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ApiResponse {
    /// A success envelope.
    #[must_use]
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            errors: None,
        }
    }

    /// A failure envelope without field detail.
    #[must_use]
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            errors: None,
        }
    }

    /// A validation failure envelope listing every violation.
    #[must_use]
    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: "Validation failed".to_string(),
            errors: Some(errors),
        }
    }
}

/// Unwrap a JSON body, turning a malformed or mistyped body into a
/// validation failure on the payload itself.
pub(crate) fn read_payload(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Value, ValidationErrors> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ValidationErrors::single("", rejection.body_text()))
}

/// Create the `/api` routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/contact", post(contact::submit))
        .route("/contacts", get(admin::list_contacts))
        .route("/newsletter", post(newsletter::subscribe))
        .route("/newsletters", get(admin::list_newsletter_subscribers))
        .route(
            "/job-applications",
            post(careers::apply).get(admin::list_job_applications),
        )
        .route(
            "/course-enrollments",
            post(courses::enroll).get(admin::list_course_enrollments),
        )
}

/// Build the complete application router.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn app(state: AppState) -> Router {
    let mut api = api_routes();
    if state.config().rate_limit {
        api = api.layer(api_rate_limiter(state.config().trust_proxy_headers));
    }

    let mut router = Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span));

    if let Some(origin) = state.config().cors_origin.as_deref() {
        match HeaderValue::from_str(origin) {
            Ok(origin) => {
                router = router.layer(
                    CorsLayer::new()
                        .allow_origin(origin)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
                );
            }
            Err(e) => {
                tracing::warn!(origin, error = %e, "Ignoring invalid CORS origin");
            }
        }
    }

    router.with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
async fn health() -> &'static str {
    "ok"
}

/// Root span for each request; `request_id` is filled in by the request ID middleware.
fn make_request_span(request: &axum::http::Request<axum::body::Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::config::SiteConfig;
    use crate::store::FormStore;

    #[test]
    fn test_ok_envelope_omits_errors() {
        let value = serde_json::to_value(ApiResponse::ok("Done")).unwrap();
        assert_eq!(value, json!({"success": true, "message": "Done"}));
    }

    #[test]
    fn test_invalid_envelope_lists_errors() {
        let errors = vec![FieldError::new("name", "Name is required")];
        let value = serde_json::to_value(ApiResponse::invalid(errors)).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "message": "Validation failed",
                "errors": [{"field": "name", "message": "Name is required"}]
            })
        );
    }

    #[test]
    fn test_read_payload_passes_json_through() {
        let payload = read_payload(Ok(Json(json!({"email": "a@b.co"})))).unwrap();
        assert_eq!(payload["email"], "a@b.co");
    }

    #[tokio::test]
    async fn test_rate_limited_router_refuses_requests_without_client_ip() {
        let router = app(AppState::new(SiteConfig::default(), FormStore::new()));

        let response = router
            .oneshot(
                Request::post("/api/newsletter")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"email":"a@b.co"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_server_error());
    }

    fn forwarded_newsletter_request() -> Request<Body> {
        Request::post("/api/newsletter")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::from(r#"{"email":"a@b.co"}"#))
            .unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_router_accepts_forwarded_client_behind_proxy() {
        let config = SiteConfig {
            trust_proxy_headers: true,
            ..SiteConfig::default()
        };
        let router = app(AppState::new(config, FormStore::new()));

        let response = router.oneshot(forwarded_newsletter_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limited_router_ignores_forwarded_header_by_default() {
        let router = app(AppState::new(SiteConfig::default(), FormStore::new()));

        let response = router.oneshot(forwarded_newsletter_request()).await.unwrap();

        assert!(response.status().is_server_error());
    }
}
