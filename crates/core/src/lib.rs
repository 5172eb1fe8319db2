//! CodeVente Core - Shared types library.
//!
//! This crate provides common types used across the CodeVente components:
//! - `site` - Form intake API backing the marketing website
//! - `integration-tests` - End-to-end tests driving the site router
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP handling. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and email addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
