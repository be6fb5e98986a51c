//! # Errors
//!
//! ```text
//! ValidationError ──► CoreError ──────┐
//!        │                            ├──► CliError (apps/cli)
//!        └──────────► DbError ────────┘
//!                     (stockroom-db)
//! ```
//!
//! Evaluation has no error path of its own. A rule that cannot be
//! evaluated simply does not match; everything here comes from input
//! validation or from lookups by id.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CoreError {
    /// No tax with this id.
    #[error("Tax not found: {0}")]
    TaxNotFound(String),

    /// Negative base price, quantity or total amount.
    #[error("Invalid calculation context: {0}")]
    InvalidContext(ValidationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single field that failed validation, named in its wire (camelCase) form.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid UUID, non-finite number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Rule operator cannot be used with the rule's value type.
    #[error("operator '{operator}' cannot be used with {value_type} values")]
    IncompatibleOperator { operator: String, value_type: String },
}

impl ValidationError {
    /// Creates a NotAllowed error from a list of accepted spellings.
    pub fn not_allowed(field: impl Into<String>, allowed: &[&str]) -> Self {
        ValidationError::NotAllowed {
            field: field.into(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::TaxNotFound("abc".to_string());
        assert_eq!(err.to_string(), "Tax not found: abc");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        };
        assert_eq!(err.to_string(), "name must be at most 100 characters");

        let err = ValidationError::IncompatibleOperator {
            operator: ">=".to_string(),
            value_type: "array".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "operator '>=' cannot be used with array values"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
