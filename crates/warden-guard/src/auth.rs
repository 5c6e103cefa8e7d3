//! # Boundary Authorization
//!
//! The shared-secret check, as an explicit capability instead of a constant
//! compared inline wherever someone remembered to.
//!
//! Callers hold one [`Authorizer`] and check every inbound request against
//! it exactly once at the boundary; the core never sees the secret. Swapping
//! the implementation (per-tenant keys, a token service) does not touch the
//! call sites.

use crate::error::GuardError;

/// Checks whether a presented security key authorizes the request.
pub trait Authorizer: Send + Sync {
    /// Validates the presented key.
    ///
    /// ## Returns
    /// * `Err(GuardError::MissingKey)` - nothing was presented
    /// * `Err(GuardError::InvalidKey)` - presented but wrong
    fn authorize(&self, presented: Option<&str>) -> Result<(), GuardError>;
}

/// Authorizer backed by a single process-wide shared secret.
pub struct SharedSecretAuthorizer {
    secret: String,
}

impl SharedSecretAuthorizer {
    /// Creates an authorizer for the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        SharedSecretAuthorizer {
            secret: secret.into(),
        }
    }
}

impl Authorizer for SharedSecretAuthorizer {
    fn authorize(&self, presented: Option<&str>) -> Result<(), GuardError> {
        match presented {
            None => Err(GuardError::MissingKey),
            Some(key) if key == self.secret => Ok(()),
            Some(_) => Err(GuardError::InvalidKey),
        }
    }
}

impl std::fmt::Debug for SharedSecretAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The secret stays out of logs and panics.
        f.debug_struct("SharedSecretAuthorizer").finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_matching_key() {
        let auth = SharedSecretAuthorizer::new("s3cret");
        assert!(auth.authorize(Some("s3cret")).is_ok());
    }

    #[test]
    fn test_missing_and_wrong_keys_are_distinct() {
        let auth = SharedSecretAuthorizer::new("s3cret");
        assert_eq!(auth.authorize(None), Err(GuardError::MissingKey));
        assert_eq!(auth.authorize(Some("nope")), Err(GuardError::InvalidKey));
        assert_eq!(auth.authorize(Some("")), Err(GuardError::InvalidKey));
    }

    #[test]
    fn test_debug_does_not_leak_the_secret() {
        let auth = SharedSecretAuthorizer::new("s3cret");
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_usable_as_trait_object() {
        let auth: Box<dyn Authorizer> = Box::new(SharedSecretAuthorizer::new("k"));
        assert!(auth.authorize(Some("k")).is_ok());
    }
}
