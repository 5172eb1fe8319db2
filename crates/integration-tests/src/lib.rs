//! Integration tests for the CodeVente site API.
//!
//! The tests drive the real router in-process with `tower::ServiceExt::oneshot`,
//! so no server, port, or external service is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p codevente-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `contact` - Contact form submissions
//! - `newsletter` - Newsletter signups and duplicate handling
//! - `careers` - Job applications
//! - `courses` - Course enrollments
//! - `admin` - Admin credentials and listings
//! - `app` - Health check and response headers

#![allow(clippy::missing_panics_doc)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use codevente_site::config::SiteConfig;
use codevente_site::services::auth::AuthService;
use codevente_site::store::FormStore;
use codevente_site::{AppState, app};

/// Username of the admin seeded into every test context.
pub const ADMIN_USERNAME: &str = "admin";

/// Password of the admin seeded into every test context.
pub const ADMIN_PASSWORD: &str = "Kt8#wQz2!mVr5pLx";

/// A response with its body decoded.
///
/// JSON bodies are parsed; anything else is kept as a JSON string, and an
/// empty body becomes `null`.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The envelope's `message` field.
    #[must_use]
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    /// Field names listed in the envelope's `errors`, in order.
    #[must_use]
    pub fn error_fields(&self) -> Vec<&str> {
        self.body["errors"]
            .as_array()
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e["field"].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The message reported for one field, if any.
    #[must_use]
    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.body["errors"]
            .as_array()?
            .iter()
            .find(|e| e["field"] == field)
            .and_then(|e| e["message"].as_str())
    }
}

/// An isolated application with its own store and a seeded admin.
pub struct TestContext {
    pub state: AppState,
    router: Router,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Build a context with rate limiting off and the test admin seeded.
    #[must_use]
    pub fn new() -> Self {
        let config = SiteConfig {
            rate_limit: false,
            admin_username: ADMIN_USERNAME.to_string(),
            admin_password: Some(SecretString::from(ADMIN_PASSWORD)),
            ..SiteConfig::default()
        };
        Self::with_config(config, true)
    }

    /// Build a context without any admin account.
    #[must_use]
    pub fn without_admin() -> Self {
        let config = SiteConfig {
            rate_limit: false,
            ..SiteConfig::default()
        };
        Self::with_config(config, false)
    }

    fn with_config(config: SiteConfig, seed_admin: bool) -> Self {
        let store = FormStore::new();
        if seed_admin {
            AuthService::new(&store)
                .register_with_password(ADMIN_USERNAME, ADMIN_PASSWORD)
                .expect("seeding the test admin should succeed");
        }

        let state = AppState::new(config, store);
        let router = app(state.clone());
        Self { state, router }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body should be readable");

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// POST a JSON body.
    pub async fn post_json(&self, path: &str, body: &Value) -> TestResponse {
        self.post_raw(path, "application/json", &body.to_string())
            .await
    }

    /// POST an arbitrary body with the given content type.
    pub async fn post_raw(&self, path: &str, content_type: &str, body: &str) -> TestResponse {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .expect("request should build");
        self.send(request).await
    }

    /// GET without credentials.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::get(path)
            .body(Body::empty())
            .expect("request should build");
        self.send(request).await
    }

    /// GET with HTTP Basic credentials.
    pub async fn get_with_credentials(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> TestResponse {
        let credentials = STANDARD.encode(format!("{username}:{password}"));
        let request = Request::get(path)
            .header(header::AUTHORIZATION, format!("Basic {credentials}"))
            .body(Body::empty())
            .expect("request should build");
        self.send(request).await
    }

    /// GET as the seeded admin.
    pub async fn get_as_admin(&self, path: &str) -> TestResponse {
        self.get_with_credentials(path, ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
    }
}

/// Payload builders for valid submissions.
pub mod payloads {
    use serde_json::{Value, json};

    /// A valid contact message.
    #[must_use]
    pub fn contact(name: &str) -> Value {
        json!({
            "name": name,
            "email": "ada@example.com",
            "company": "Analytical Engines Ltd",
            "service": "web-development",
            "budget": "10k-25k",
            "message": "We need a new marketing site for our launch.",
            "newsletter": true
        })
    }

    /// A valid job application.
    #[must_use]
    pub fn job_application(position: &str) -> Value {
        json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "phone": "+1 555 0100",
            "position": position,
            "experience": "senior",
            "coverLetter": "I have spent many years building compilers and would love to join.",
            "portfolioUrl": "https://example.com/grace",
            "linkedinUrl": "",
            "availability": "2 weeks",
            "salary": "negotiable",
            "remote": true
        })
    }

    /// A valid course enrollment.
    #[must_use]
    pub fn course_enrollment(course_id: &str) -> Value {
        json!({
            "firstName": "Alan",
            "lastName": "Turing",
            "email": "alan@example.com",
            "courseId": course_id,
            "courseName": "Full-Stack Web Development",
            "experience": "beginner",
            "goals": "Build and ship my own web applications.",
            "heardAbout": "friend",
            "newsletter": false
        })
    }
}
