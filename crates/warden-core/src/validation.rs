//! # Validation Module
//!
//! Input validation rules for Warden.
//!
//! Callers are expected to validate at their own boundary too; the store
//! calls these again before writing so a misbehaving caller cannot insert
//! unusable records. Validation here is about input *shape* - whether the
//! value collides with an existing record is the uniqueness enforcer's job.
//!
//! ## Usage
//! ```rust
//! use warden_core::validation::{validate_name, validate_actor};
//!
//! validate_name("Admin").unwrap();
//! validate_actor("user-42").unwrap();
//! assert!(validate_name("").is_err());
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::{MAX_NAME_LEN, MAX_TEXT_LEN};

// =============================================================================
// String Validators
// =============================================================================

/// Validates a role or page name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_NAME_LEN`] characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a required free-text field (display text, address line, city,
/// address type).
pub fn validate_text(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates an optional free-text field; `None` is always acceptable.
pub fn validate_optional_text(field: &str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(v) if v.len() > MAX_TEXT_LEN => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        }),
        _ => Ok(()),
    }
}

/// Validates the actor id attached to a mutating call.
///
/// The actor is part of the audit contract: every write records who made it,
/// and "nobody" is not an answer.
pub fn validate_actor(actor: &str) -> ValidationResult<()> {
    if actor.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "actor".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a latitude/longitude pair.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> ValidationResult<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::OutOfRange {
            field: "latitude".to_string(),
            min: -90,
            max: 90,
        });
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::OutOfRange {
            field: "longitude".to_string(),
            min: -180,
            max: 180,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Admin").is_ok());
        assert!(validate_name("  Admin  ").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_text() {
        assert!(validate_text("city", "Pune").is_ok());
        assert_eq!(
            validate_text("city", ""),
            Err(ValidationError::Required {
                field: "city".to_string()
            })
        );
        assert!(validate_text("address_line1", &"x".repeat(MAX_TEXT_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_optional_text() {
        assert!(validate_optional_text("map_url", None).is_ok());
        assert!(validate_optional_text("map_url", Some("https://example.com")).is_ok());
        assert!(validate_optional_text("map_url", Some(&"x".repeat(MAX_TEXT_LEN + 1))).is_err());
    }

    #[test]
    fn test_validate_actor() {
        assert!(validate_actor("user-1").is_ok());
        assert!(validate_actor("").is_err());
        assert!(validate_actor("  ").is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(18.52, 73.85).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
    }
}
