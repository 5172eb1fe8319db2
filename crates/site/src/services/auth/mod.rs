//! Authentication service.
//!
//! Provides password authentication for site users. Passwords are stored
//! only as argon2 PHC strings.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::models::{NewUser, User};
use crate::store::{FormStore, StoreError};

/// Minimum password length, for site users and the configured admin alike.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Hash checked when the username is unknown, so that login costs one
/// argon2 verification whether or not the user exists.
static DUMMY_PASSWORD_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("codevente-unknown-user").ok());

/// Authentication service.
///
/// Handles user registration and password login against the [`FormStore`].
pub struct AuthService<'a> {
    store: &'a FormStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a FormStore) -> Self {
        Self { store }
    }

    /// Register a new user with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmptyUsername` if the username is blank.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the username is already registered.
    pub fn register_with_password(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }

        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.store
            .create_user(NewUser {
                username: username.to_owned(),
                password_hash,
            })
            .map_err(|e| match e {
                StoreError::UsernameTaken => AuthError::UserAlreadyExists,
                other => AuthError::Store(other),
            })
    }

    /// Login with username and password.
    ///
    /// An unknown username and a wrong password are indistinguishable to the
    /// caller, in result and in cost. This blocks on argon2; call it from
    /// `spawn_blocking` inside async code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub fn login_with_password(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.store.get_user_by_username(username)? else {
            if let Some(hash) = DUMMY_PASSWORD_HASH.as_deref() {
                let _ = verify_password(password, hash);
            }
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password with argon2.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
