//! CodeVente site library.
//!
//! Form intake API for the marketing site: contact messages, newsletter
//! signups, job applications, and course enrollments, held in memory and
//! listed back to an authenticated admin. Exposed as a library so the router
//! can be driven from integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;

pub use routes::app;
pub use state::AppState;
