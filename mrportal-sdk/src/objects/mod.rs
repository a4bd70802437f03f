//! Request and response bodies of the portal API.
//!
//! Request bodies are parsed into loosely-typed structs (every field
//! optional) and then turned into their validated counterpart through
//! [`Validate`]. A failed validation reports every offending field at once.

pub mod account;
pub mod catalog;
pub mod forms;
pub mod payment;

use serde::{Deserialize, Serialize};

/// Boundary validation: turns a raw request into its checked form.
pub trait Validate: Sized {
    type Valid;

    fn validate(self) -> Result<Self::Valid, ValidationErrors>;
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Accumulates field errors for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    message: String,
    fields: Vec<FieldError>,
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new("Request validation failed")
    }
}

impl ValidationErrors {
    /// Create an empty error list with a summary message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Error for a body that could not be parsed at all.
    pub fn malformed(detail: impl Into<String>) -> Self {
        let mut errors = Self::new("Malformed request body");
        errors.add("body", detail);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Record `field` as missing when `value` is absent or blank, otherwise
    /// return the trimmed value.
    pub fn require_text(&mut self, field: &str, value: Option<String>) -> Option<String> {
        match non_blank(value) {
            Some(v) => Some(v),
            None => {
                self.add(field, "is required");
                None
            }
        }
    }

    /// Record `field` as missing when `value` is absent.
    pub fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, "is required");
        }
        value
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Trim `value` and drop it when empty.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// `{ "message": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `{ "message": ..., "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub message: String,
    pub data: T,
}

/// Error body returned for every 4xx/5xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_trims_and_flags_blank() {
        let mut errors = ValidationErrors::default();
        assert_eq!(
            errors.require_text("name", Some("  Asha ".to_string())),
            Some("Asha".to_string())
        );
        assert_eq!(errors.require_text("email", Some("   ".to_string())), None);
        assert_eq!(errors.require_text("city", None), None);
        let fields: Vec<_> = errors.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "city"]);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_empty_errors_are_ok() {
        assert!(ValidationErrors::default().into_result().is_ok());
    }
}
