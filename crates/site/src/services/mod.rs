//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Site user authentication (password, argon2)

pub mod auth;
