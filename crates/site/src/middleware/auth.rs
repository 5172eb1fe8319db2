//! Admin authentication extractor.
//!
//! Listing endpoints expose submitted personal data, so they require HTTP
//! Basic credentials for a user in the store.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Extractor that requires admin credentials.
///
/// Rejects with `401 Unauthorized` and a `WWW-Authenticate` challenge when
/// the `Authorization` header is missing, malformed, or wrong.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (username, password) = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_basic_credentials)
            .ok_or(AppError::Unauthorized)?;

        // argon2 verification is CPU-bound; keep it off the async workers.
        let state = state.clone();
        let login_username = username.clone();
        let login = tokio::task::spawn_blocking(move || {
            AuthService::new(state.store()).login_with_password(&login_username, &password)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

        match login {
            Ok(user) => Ok(Self(user)),
            Err(AuthError::InvalidCredentials) => {
                tracing::warn!(username = %username, "Rejected admin credentials");
                Err(AppError::Unauthorized)
            }
            Err(e) => Err(AppError::Internal(e.to_string())),
        }
    }
}

/// Decode an `Authorization: Basic <base64(user:pass)>` header value.
///
/// The password may contain colons; the username may not.
fn parse_basic_credentials(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}
