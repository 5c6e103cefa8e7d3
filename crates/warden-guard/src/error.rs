//! Guard error types.
//!
//! Only authorization can fail here; fingerprinting and rate limiting are
//! total functions by design.

use thiserror::Error;

/// Errors from the guard layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    /// No security key was presented at all.
    #[error("Security key is required")]
    MissingKey,

    /// A key was presented but does not match the configured secret.
    #[error("Invalid security key")]
    InvalidKey,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(GuardError::MissingKey.to_string(), "Security key is required");
        assert_eq!(GuardError::InvalidKey.to_string(), "Invalid security key");
    }
}
