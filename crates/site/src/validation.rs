//! Declarative payload validation for form submissions.
//!
//! Each submission kind declares a [`Schema`]: an ordered table of
//! [`FieldRule`]s. [`validate`] evaluates every rule against the raw JSON
//! payload and collects *all* violations before returning, so a client can
//! fix the whole form in one round trip.
//!
//! On success the checked values are handed back as [`Fields`], from which
//! the model constructors pull typed values with defaults applied.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use codevente_core::Email;

/// Message for a required field that is absent from the payload.
pub const REQUIRED: &str = "Required";

/// Message for an email field that fails format checks.
pub const INVALID_EMAIL: &str = "Please enter a valid email address";

/// Message for a URL field that fails to parse.
pub const INVALID_URL: &str = "Please enter a valid URL";

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Payload key the violation applies to (empty for the payload itself).
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All violations found in one payload, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// A single violation.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    /// The violations, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Consume into the list of violations.
    #[must_use]
    pub fn into_errors(self) -> Vec<FieldError> {
        self.0
    }

    /// Whether any violation concerns `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} field violation(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "; {}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// The constraint applied to one field.
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// A string of at least `min_len` characters.
    Text {
        min_len: usize,
        message: &'static str,
    },
    /// A structurally valid email address.
    Email,
    /// An absolute URL. The empty string counts as absent.
    Url,
    /// A boolean. Absent means `false`.
    Flag,
}

/// One entry of a [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub required: bool,
    pub check: Check,
}

impl FieldRule {
    /// A required string with a minimum character count.
    #[must_use]
    pub const fn text(name: &'static str, min_len: usize, message: &'static str) -> Self {
        Self {
            name,
            required: true,
            check: Check::Text { min_len, message },
        }
    }

    /// An optional free-form string.
    #[must_use]
    pub const fn optional_text(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            check: Check::Text {
                min_len: 0,
                message: "",
            },
        }
    }

    /// A required email address.
    #[must_use]
    pub const fn email(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            check: Check::Email,
        }
    }

    /// An optional URL; empty strings are accepted and dropped.
    #[must_use]
    pub const fn optional_url(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            check: Check::Url,
        }
    }

    /// A boolean flag defaulting to `false`.
    #[must_use]
    pub const fn flag(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            check: Check::Flag,
        }
    }
}

/// Ordered field rules for one submission kind.
pub type Schema = &'static [FieldRule];

#[derive(Debug)]
enum FieldValue {
    Text(String),
    Email(Email),
    Flag(bool),
}

/// Values that passed validation, keyed by field name.
///
/// Accessors take the value out, so each field is read at most once.
#[derive(Debug, Default)]
pub struct Fields {
    values: HashMap<&'static str, FieldValue>,
}

impl Fields {
    /// Take a required string.
    ///
    /// # Errors
    ///
    /// Returns a `Required` violation if the field was not validated as text.
    pub fn text(&mut self, name: &'static str) -> Result<String, ValidationErrors> {
        match self.values.remove(name) {
            Some(FieldValue::Text(s)) => Ok(s),
            _ => Err(ValidationErrors::single(name, REQUIRED)),
        }
    }

    /// Take an optional string (including optional URLs).
    pub fn optional_text(&mut self, name: &'static str) -> Option<String> {
        match self.values.remove(name) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Take a required email address.
    ///
    /// # Errors
    ///
    /// Returns a `Required` violation if the field was not validated as an email.
    pub fn email(&mut self, name: &'static str) -> Result<Email, ValidationErrors> {
        match self.values.remove(name) {
            Some(FieldValue::Email(e)) => Ok(e),
            _ => Err(ValidationErrors::single(name, REQUIRED)),
        }
    }

    /// Take a flag, defaulting to `false`.
    pub fn flag(&mut self, name: &'static str) -> bool {
        matches!(self.values.remove(name), Some(FieldValue::Flag(true)))
    }
}

/// Validate `payload` against every rule in `schema`.
///
/// Unknown keys are ignored. `null` on an optional field is treated as absent.
///
/// # Errors
///
/// Returns every violation found, in schema order.
pub fn validate(schema: Schema, payload: &Value) -> Result<Fields, ValidationErrors> {
    let Value::Object(object) = payload else {
        return Err(ValidationErrors::single(
            "",
            format!("Expected object, received {}", json_type(payload)),
        ));
    };

    let mut fields = Fields::default();
    let mut errors = Vec::new();

    for rule in schema {
        match check_field(rule, object) {
            Ok(Some(value)) => {
                fields.values.insert(rule.name, value);
            }
            Ok(None) => {}
            Err(message) => errors.push(FieldError::new(rule.name, message)),
        }
    }

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(ValidationErrors(errors))
    }
}

fn check_field(rule: &FieldRule, object: &Map<String, Value>) -> Result<Option<FieldValue>, String> {
    let value = match object.get(rule.name) {
        None => return absent(rule),
        Some(Value::Null) if !rule.required => return absent(rule),
        Some(value) => value,
    };

    match rule.check {
        Check::Flag => match value {
            Value::Bool(b) => Ok(Some(FieldValue::Flag(*b))),
            other => Err(type_mismatch("boolean", other)),
        },
        Check::Text { min_len, message } => {
            let s = expect_string(value)?;
            if s.chars().count() < min_len {
                return Err(message.to_owned());
            }
            Ok(Some(FieldValue::Text(s.to_owned())))
        }
        Check::Email => {
            let s = expect_string(value)?;
            Email::parse(s)
                .map(|email| Some(FieldValue::Email(email)))
                .map_err(|_| INVALID_EMAIL.to_owned())
        }
        Check::Url => {
            let s = expect_string(value)?;
            if s.is_empty() {
                return Ok(None);
            }
            Url::parse(s)
                .map(|_| Some(FieldValue::Text(s.to_owned())))
                .map_err(|_| INVALID_URL.to_owned())
        }
    }
}

fn absent(rule: &FieldRule) -> Result<Option<FieldValue>, String> {
    if rule.required {
        Err(REQUIRED.to_owned())
    } else {
        Ok(None)
    }
}

fn expect_string(value: &Value) -> Result<&str, String> {
    value.as_str().ok_or_else(|| type_mismatch("string", value))
}

fn type_mismatch(expected: &str, received: &Value) -> String {
    format!("Expected {expected}, received {}", json_type(received))
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    const SCHEMA: Schema = &[
        FieldRule::text("name", 1, "Name is required"),
        FieldRule::email("email"),
        FieldRule::optional_text("company"),
        FieldRule::optional_url("site"),
        FieldRule::text("bio", 5, "Bio too short"),
        FieldRule::flag("subscribe"),
    ];

    #[test]
    fn test_valid_payload_yields_fields() {
        let payload = json!({
            "name": "Ada",
            "email": "ada@example.com",
            "bio": "Engineer",
            "site": "https://ada.dev",
            "subscribe": true,
        });

        let mut fields = validate(SCHEMA, &payload).unwrap();
        assert_eq!(fields.text("name").unwrap(), "Ada");
        assert_eq!(fields.email("email").unwrap().as_str(), "ada@example.com");
        assert_eq!(fields.optional_text("company"), None);
        assert_eq!(fields.optional_text("site").as_deref(), Some("https://ada.dev"));
        assert!(fields.flag("subscribe"));
    }

    #[test]
    fn test_collects_all_violations_in_schema_order() {
        let payload = json!({ "name": "", "email": "nope", "bio": "hi" });

        let errors = validate(SCHEMA, &payload).unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["name", "email", "bio"]);
        assert_eq!(errors.errors()[0].message, "Name is required");
        assert_eq!(errors.errors()[1].message, INVALID_EMAIL);
        assert_eq!(errors.errors()[2].message, "Bio too short");
    }

    #[test]
    fn test_missing_required_field() {
        let payload = json!({ "email": "ada@example.com", "bio": "Engineer" });

        let errors = validate(SCHEMA, &payload).unwrap_err();
        assert_eq!(errors.errors(), [FieldError::new("name", REQUIRED)]);
    }

    #[test]
    fn test_type_mismatch_messages() {
        let payload = json!({
            "name": 42,
            "email": "ada@example.com",
            "bio": "Engineer",
            "subscribe": "yes",
        });

        let errors = validate(SCHEMA, &payload).unwrap_err();
        assert_eq!(
            errors.errors(),
            [
                FieldError::new("name", "Expected string, received number"),
                FieldError::new("subscribe", "Expected boolean, received string"),
            ]
        );
    }

    #[test]
    fn test_null_optional_is_absent_but_null_required_is_not() {
        let payload = json!({
            "name": null,
            "email": "ada@example.com",
            "bio": "Engineer",
            "company": null,
            "subscribe": null,
        });

        let errors = validate(SCHEMA, &payload).unwrap_err();
        assert_eq!(
            errors.errors(),
            [FieldError::new("name", "Expected string, received null")]
        );
    }

    #[test]
    fn test_empty_url_is_accepted_and_dropped() {
        let payload = json!({
            "name": "Ada",
            "email": "ada@example.com",
            "bio": "Engineer",
            "site": "",
        });

        let mut fields = validate(SCHEMA, &payload).unwrap();
        assert_eq!(fields.optional_text("site"), None);
    }

    #[test]
    fn test_malformed_url_is_rejected() {
        let payload = json!({
            "name": "Ada",
            "email": "ada@example.com",
            "bio": "Engineer",
            "site": "not a url",
        });

        let errors = validate(SCHEMA, &payload).unwrap_err();
        assert_eq!(errors.errors(), [FieldError::new("site", INVALID_URL)]);
    }

    #[test]
    fn test_min_length_counts_characters() {
        // Five characters, more than five bytes.
        let payload = json!({ "name": "Zoë", "email": "z@example.com", "bio": "héllo" });
        assert!(validate(SCHEMA, &payload).is_ok());
    }

    #[test]
    fn test_non_object_payload() {
        let errors = validate(SCHEMA, &json!(["a"])).unwrap_err();
        assert_eq!(
            errors.errors(),
            [FieldError::new("", "Expected object, received array")]
        );
    }

    #[test]
    fn test_flag_defaults_to_false() {
        let payload = json!({ "name": "Ada", "email": "ada@example.com", "bio": "Engineer" });
        let mut fields = validate(SCHEMA, &payload).unwrap();
        assert!(!fields.flag("subscribe"));
    }

    #[test]
    fn test_display_lists_violations() {
        let errors = ValidationErrors::single("name", "Name is required");
        assert_eq!(errors.to_string(), "1 field violation(s); name: Name is required");
    }
}
