//! Field-keyed validation errors and the small rule helpers shared by every
//! form schema in the service.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Map from field path (`"endDate"`, `"contactInfo.email"`, `"experience[0].title"`)
/// to the message shown next to that field.
///
/// The first message recorded for a field wins, so rules must be applied in
/// priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("{} field(s) failed validation", .0.len())]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Merges `other` under `prefix`: `"title"` becomes `"experience[0].title"`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, message) in other.0 {
            self.add(format!("{prefix}.{field}"), message);
        }
    }

    /// `Ok(value)` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Records `message` when `value` is blank.
pub fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, message);
        false
    } else {
        true
    }
}

pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

pub fn is_valid_email(value: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
                .expect("Invalid email regex")
        })
        .is_match(value)
}

/// Grade on a 0–4 scale with at most two decimal digits: `0`, `3.5`, `3.75`, `4.0`.
pub fn is_valid_gpa(value: &str) -> bool {
    static GPA: OnceLock<Regex> = OnceLock::new();
    GPA.get_or_init(|| {
        Regex::new(r"^(?:[0-3](?:\.[0-9]{1,2})?|4(?:\.0{1,2})?)$").expect("Invalid GPA regex")
    })
    .is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.add("endDate", "End date must be in YYYY-MM format");
        errors.add("endDate", "End date is required unless this is current");
        assert_eq!(
            errors.get("endDate"),
            Some("End date must be in YYYY-MM format")
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_merge_prefixed() {
        let mut inner = FieldErrors::new();
        inner.add("title", "Title is required");
        let mut outer = FieldErrors::new();
        outer.merge_prefixed("experience[2]", inner);
        assert_eq!(outer.get("experience[2].title"), Some("Title is required"));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut errors = FieldErrors::new();
        errors.add("gpa", "bad");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"gpa": "bad"})
        );
    }

    #[test]
    fn test_require_rejects_whitespace() {
        let mut errors = FieldErrors::new();
        assert!(!require(&mut errors, "title", "   ", "Title is required"));
        assert!(require(&mut errors, "summary", "Engineer", "Summary is required"));
        assert!(errors.contains("title"));
        assert!(!errors.contains("summary"));
    }

    #[test]
    fn test_gpa_pattern() {
        for ok in ["3.5", "4.0", "0", "4", "3.75", "0.5", "4.00"] {
            assert!(is_valid_gpa(ok), "{ok} should be accepted");
        }
        for bad in ["5.0", "abc", "4.5", "3.555", "-1", "3.", ""] {
            assert!(!is_valid_gpa(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_url_check() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://localhost:3000/demo"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("example.com"));
    }

    #[test]
    fn test_email_check() {
        assert!(is_valid_email("jane.doe+jobs@example.co.uk"));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("not an email"));
    }
}
