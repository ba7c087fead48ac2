// Common validation types and traits

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Field-level validation outcome. Serializes as a `{field: message}` map;
/// the first message recorded for a field wins.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Turns a failed result into an `Err` so callers can use `?`.
    pub fn into_result(self) -> Result<(), ValidationResult> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

/// Adds `message` under `field` when `value` is blank.
pub fn require_non_empty(result: &mut ValidationResult, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        result.add_error(field, message);
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Loose shape check: something@something.tld, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_field_map() {
        let mut result = ValidationResult::new();
        result.add_error("title", "title cannot be empty");
        result.add_error("title", "ignored second message");
        result.add_error("description", "description cannot be empty");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "description": "description cannot be empty",
                "title": "title cannot be empty"
            })
        );
    }

    #[test]
    fn test_into_result() {
        let mut result = ValidationResult::new();
        assert!(result.clone().into_result().is_ok());

        result.add_error("email", "email cannot be empty");

        assert!(!result.is_valid());
        assert!(result.has_error("email"));
        assert!(result.into_result().is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("ok@ok.com"));
        assert!(is_valid_email(" john@doe.no "));
        assert!(!is_valid_email("john@doe"));
        assert!(!is_valid_email("john doe@x.no"));
        assert!(!is_valid_email("kristohb"));
    }
}
