//! Newsletter subscribers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use codevente_core::{Email, SubscriberId};

use crate::validation::{FieldRule, Schema, ValidationErrors, validate};

/// Field rules for `POST /api/newsletter`.
pub const NEWSLETTER_SCHEMA: Schema = &[FieldRule::email("email")];

/// A validated subscription request, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNewsletterSubscriber {
    pub email: Email,
}

impl NewNewsletterSubscriber {
    /// Validate a raw newsletter signup payload.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = validate(NEWSLETTER_SCHEMA, payload)?;

        Ok(Self {
            email: fields.email("email")?,
        })
    }
}

/// A stored newsletter subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    pub id: SubscriberId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

impl NewsletterSubscriber {
    pub(crate) fn new(
        id: SubscriberId,
        created_at: DateTime<Utc>,
        new: NewNewsletterSubscriber,
    ) -> Self {
        Self {
            id,
            email: new.email,
            created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_valid_email() {
        let new = NewNewsletterSubscriber::from_payload(&json!({ "email": "a@b.com" })).unwrap();
        assert_eq!(new.email.as_str(), "a@b.com");
    }

    #[test]
    fn test_malformed_email() {
        let errors =
            NewNewsletterSubscriber::from_payload(&json!({ "email": "not-an-email" })).unwrap_err();
        assert!(errors.has_field("email"));
    }

    #[test]
    fn test_structurally_invalid_emails_are_rejected() {
        for email in [
            "a@b.c",
            ".a@b.com",
            "a.@b.com",
            "a..b@x.com",
            "<script>@x.com",
            "a@-x-.com",
            "a@x.c0m",
            "\"q\"@x.com",
        ] {
            let errors =
                NewNewsletterSubscriber::from_payload(&json!({ "email": email })).unwrap_err();
            assert_eq!(
                errors.errors()[0].message,
                "Please enter a valid email address",
                "{email}"
            );
        }
    }

    #[test]
    fn test_missing_email() {
        let errors = NewNewsletterSubscriber::from_payload(&json!({})).unwrap_err();
        assert_eq!(errors.errors()[0].message, "Required");
    }
}
