//! Contact form messages.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use codevente_core::{ContactId, Email};

use crate::validation::{FieldRule, Schema, ValidationErrors, validate};

/// Field rules for `POST /api/contact`.
pub const CONTACT_SCHEMA: Schema = &[
    FieldRule::text("name", 1, "Name is required"),
    FieldRule::email("email"),
    FieldRule::optional_text("company"),
    FieldRule::optional_text("service"),
    FieldRule::optional_text("budget"),
    FieldRule::text("message", 10, "Message must be at least 10 characters long"),
    FieldRule::flag("newsletter"),
];

/// A validated contact message, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub email: Email,
    pub company: Option<String>,
    pub service: Option<String>,
    pub budget: Option<String>,
    pub message: String,
    pub newsletter: bool,
}

impl NewContact {
    /// Validate a raw contact form payload.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = validate(CONTACT_SCHEMA, payload)?;

        Ok(Self {
            name: fields.text("name")?,
            email: fields.email("email")?,
            company: fields.optional_text("company"),
            service: fields.optional_text("service"),
            budget: fields.optional_text("budget"),
            message: fields.text("message")?,
            newsletter: fields.flag("newsletter"),
        })
    }
}

/// A stored contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: Email,
    pub company: Option<String>,
    pub service: Option<String>,
    pub budget: Option<String>,
    pub message: String,
    pub newsletter: bool,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub(crate) fn new(id: ContactId, created_at: DateTime<Utc>, new: NewContact) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            company: new.company,
            service: new.service,
            budget: new.budget,
            message: new.message,
            newsletter: new.newsletter,
            created_at,
        }
    }
}
