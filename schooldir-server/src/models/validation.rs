//! Validation error types

use std::fmt;

/// Validation error for school input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more of name, city, state (or the id on update) is missing
    MissingRequired,

    /// No school id supplied to a delete
    MissingId,

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (contact number, email, id)
    InvalidFormat { field: &'static str, reason: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired => write!(f, "Missing required fields"),
            Self::MissingId => write!(f, "School ID is required"),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "name",
            max: 255,
        };
        assert_eq!(
            err.to_string(),
            "name exceeds maximum length of 255 characters"
        );
        assert_eq!(
            ValidationError::MissingRequired.to_string(),
            "Missing required fields"
        );
    }
}
