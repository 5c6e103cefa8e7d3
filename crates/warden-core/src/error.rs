//! # Error Types
//!
//! Validation error types for warden-core.
//!
//! The store-facing taxonomy (`NotFound`, `Conflict`, `InvalidState`, plus
//! internal faults) lives in `warden-db`; this crate only knows about the
//! shape of input, not about records that exist elsewhere.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, limits)
//! 3. Errors are enum variants, never String

use thiserror::Error;

/// Input validation errors.
///
/// These occur before any business logic runs: the input itself is not
/// acceptable, regardless of store state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (bad characters, malformed reference).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "description".to_string(),
            max: 255,
        };
        assert_eq!(err.to_string(), "description must be at most 255 characters");
    }
}
