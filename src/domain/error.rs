//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Validation and domain rule failures
///
/// These are always the caller's fault and never retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A required field was absent or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field exceeds its storage limit
    #[error("Field '{field}' exceeds {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    /// Unknown release label type
    #[error("Invalid label type: {0}")]
    InvalidLabelType(String),

    /// Unknown section key
    #[error("Invalid section: {0}")]
    InvalidSection(String),

    /// Unparseable date
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Form-level validation failure
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Check that a required string field is present
    pub fn require(field: &'static str, value: &str) -> Result<(), DomainError> {
        if value.trim().is_empty() {
            return Err(Self::MissingField(field));
        }
        Ok(())
    }

    /// Check a field against its character limit
    pub fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
        if value.chars().count() > max {
            return Err(Self::FieldTooLong { field, max });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(DomainError::require("message", "hello").is_ok());
        assert_eq!(
            DomainError::require("message", "   "),
            Err(DomainError::MissingField("message"))
        );
    }

    #[test]
    fn test_check_length_counts_chars() {
        // 3 chars, 9 bytes
        assert!(DomainError::check_length("title", "日本語", 3).is_ok());
        let err = DomainError::check_length("title", "日本語!", 3).unwrap_err();
        assert!(err.to_string().contains("title"));
        assert!(err.to_string().contains('3'));
    }
}
