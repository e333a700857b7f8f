//! API client validation utilities

use thiserror::Error;

/// Errors that can occur during API client validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiClientValidationError {
    #[error("Label cannot be empty")]
    EmptyLabel,

    #[error("Label exceeds maximum length of {0} characters")]
    LabelTooLong(usize),
}

const MAX_LABEL_LENGTH: usize = 100;

/// Validate a client label
///
/// Rules:
/// - Cannot be empty or whitespace-only
/// - Maximum 100 characters
pub fn validate_label(label: &str) -> Result<(), ApiClientValidationError> {
    if label.trim().is_empty() {
        return Err(ApiClientValidationError::EmptyLabel);
    }

    if label.chars().count() > MAX_LABEL_LENGTH {
        return Err(ApiClientValidationError::LabelTooLong(MAX_LABEL_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_labels() {
        assert!(validate_label("Production integration").is_ok());
        assert!(validate_label("a").is_ok());
        assert!(validate_label(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn test_empty_label() {
        assert_eq!(
            validate_label(""),
            Err(ApiClientValidationError::EmptyLabel)
        );
        assert_eq!(
            validate_label("   "),
            Err(ApiClientValidationError::EmptyLabel)
        );
    }

    #[test]
    fn test_label_too_long() {
        let long = "x".repeat(101);
        assert_eq!(
            validate_label(&long),
            Err(ApiClientValidationError::LabelTooLong(100))
        );
    }
}
