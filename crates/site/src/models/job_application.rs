//! Job applications submitted from the careers page.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use codevente_core::{Email, JobApplicationId};

use crate::validation::{FieldRule, Schema, ValidationErrors, validate};

/// Field rules for `POST /api/job-applications`.
pub const JOB_APPLICATION_SCHEMA: Schema = &[
    FieldRule::text("firstName", 1, "First name is required"),
    FieldRule::text("lastName", 1, "Last name is required"),
    FieldRule::email("email"),
    FieldRule::optional_text("phone"),
    FieldRule::text("position", 1, "Position is required"),
    FieldRule::text("experience", 1, "Experience level is required"),
    FieldRule::text(
        "coverLetter",
        50,
        "Cover letter must be at least 50 characters long",
    ),
    FieldRule::optional_url("portfolioUrl"),
    FieldRule::optional_url("linkedinUrl"),
    FieldRule::optional_text("availability"),
    FieldRule::optional_text("salary"),
    FieldRule::flag("remote"),
];

/// A validated job application, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJobApplication {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub position: String,
    pub experience: String,
    pub cover_letter: String,
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub availability: Option<String>,
    pub salary: Option<String>,
    pub remote: bool,
}

impl NewJobApplication {
    /// Validate a raw job application payload.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut fields = validate(JOB_APPLICATION_SCHEMA, payload)?;

        Ok(Self {
            first_name: fields.text("firstName")?,
            last_name: fields.text("lastName")?,
            email: fields.email("email")?,
            phone: fields.optional_text("phone"),
            position: fields.text("position")?,
            experience: fields.text("experience")?,
            cover_letter: fields.text("coverLetter")?,
            portfolio_url: fields.optional_text("portfolioUrl"),
            linkedin_url: fields.optional_text("linkedinUrl"),
            availability: fields.optional_text("availability"),
            salary: fields.optional_text("salary"),
            remote: fields.flag("remote"),
        })
    }
}

/// A stored job application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: JobApplicationId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub position: String,
    pub experience: String,
    pub cover_letter: String,
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub availability: Option<String>,
    pub salary: Option<String>,
    pub remote: bool,
    pub created_at: DateTime<Utc>,
}

impl JobApplication {
    pub(crate) fn new(
        id: JobApplicationId,
        created_at: DateTime<Utc>,
        new: NewJobApplication,
    ) -> Self {
        Self {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            position: new.position,
            experience: new.experience,
            cover_letter: new.cover_letter,
            portfolio_url: new.portfolio_url,
            linkedin_url: new.linkedin_url,
            availability: new.availability,
            salary: new.salary,
            remote: new.remote,
            created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn payload(cover_letter: &str) -> Value {
        json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "position": "Senior Rust Engineer",
            "experience": "10+ years",
            "coverLetter": cover_letter,
        })
    }

    #[test]
    fn test_cover_letter_length_boundary() {
        assert!(NewJobApplication::from_payload(&payload(&"x".repeat(50))).is_ok());

        let errors = NewJobApplication::from_payload(&payload(&"x".repeat(49))).unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].field, "coverLetter");
    }

    #[test]
    fn test_defaults_for_omitted_optionals() {
        let app = NewJobApplication::from_payload(&payload(&"x".repeat(60))).unwrap();
        assert_eq!(app.phone, None);
        assert_eq!(app.portfolio_url, None);
        assert_eq!(app.availability, None);
        assert!(!app.remote);
    }

    #[test]
    fn test_empty_urls_pass() {
        let mut body = payload(&"x".repeat(60));
        body["portfolioUrl"] = json!("");
        body["linkedinUrl"] = json!("");

        let app = NewJobApplication::from_payload(&body).unwrap();
        assert_eq!(app.portfolio_url, None);
        assert_eq!(app.linkedin_url, None);
    }

    #[test]
    fn test_invalid_urls_are_all_reported() {
        let mut body = payload(&"x".repeat(60));
        body["portfolioUrl"] = json!("portfolio");
        body["linkedinUrl"] = json!("linkedin dot com");

        let errors = NewJobApplication::from_payload(&body).unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["portfolioUrl", "linkedinUrl"]);
    }

    #[test]
    fn test_valid_urls_are_kept_verbatim() {
        let mut body = payload(&"x".repeat(60));
        body["linkedinUrl"] = json!("https://linkedin.com/in/grace");
        body["remote"] = json!(true);

        let app = NewJobApplication::from_payload(&body).unwrap();
        assert_eq!(app.linkedin_url.as_deref(), Some("https://linkedin.com/in/grace"));
        assert!(app.remote);
    }

    #[test]
    fn test_empty_payload_reports_every_required_field() {
        let errors = NewJobApplication::from_payload(&json!({})).unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            ["firstName", "lastName", "email", "position", "experience", "coverLetter"]
        );
    }
}
