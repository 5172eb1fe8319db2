//! Site users.
//!
//! Users are not created over HTTP. The configured admin account is seeded
//! at startup and authenticates the read endpoints.

use chrono::{DateTime, Utc};

use codevente_core::UserId;

/// A user to be stored. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// A stored user.
///
/// Has no `Serialize` impl, so the hash cannot end up in a response body.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(id: UserId, created_at: DateTime<Utc>, new: NewUser) -> Self {
        Self {
            id,
            username: new.username,
            password_hash: new.password_hash,
            created_at,
        }
    }
}
