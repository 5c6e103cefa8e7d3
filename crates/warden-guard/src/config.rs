//! Guard configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults - except the shared secret, which has no safe default and must
//! be set explicitly.

use std::env;

use serde::{Deserialize, Serialize};

use crate::auth::SharedSecretAuthorizer;
use crate::rate_limit::RateLimiter;

/// Guard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Shared secret checked by the boundary authorizer.
    pub shared_secret: String,

    /// Rate-limit window length in seconds.
    pub rate_limit_window_secs: u64,

    /// Maximum requests per identity inside one window.
    pub rate_limit_max_requests: usize,
}

impl GuardConfig {
    /// Load configuration from environment variables.
    ///
    /// ## Variables
    /// * `WARDEN_SHARED_SECRET` - required, no default
    /// * `WARDEN_RATE_WINDOW_SECS` - default 60
    /// * `WARDEN_RATE_MAX_REQUESTS` - default 100
    pub fn load() -> Result<Self, ConfigError> {
        let config = GuardConfig {
            shared_secret: env::var("WARDEN_SHARED_SECRET")
                .map_err(|_| ConfigError::MissingRequired("WARDEN_SHARED_SECRET".to_string()))?,

            rate_limit_window_secs: env::var("WARDEN_RATE_WINDOW_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("WARDEN_RATE_WINDOW_SECS".to_string()))?,

            rate_limit_max_requests: env::var("WARDEN_RATE_MAX_REQUESTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("WARDEN_RATE_MAX_REQUESTS".to_string()))?,
        };

        if config.shared_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired(
                "WARDEN_SHARED_SECRET".to_string(),
            ));
        }

        if config.rate_limit_window_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "WARDEN_RATE_WINDOW_SECS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Builds the boundary authorizer for this configuration.
    pub fn authorizer(&self) -> SharedSecretAuthorizer {
        SharedSecretAuthorizer::new(self.shared_secret.clone())
    }

    /// Builds a rate limiter; pair it with the configured window and cap.
    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new()
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Authorizer;
    use parking_lot::Mutex;

    // Environment access is process-global and tests run in parallel, so
    // every test touching the variables holds this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults_apply_when_only_secret_is_set() {
        let _env = ENV_LOCK.lock();
        env::set_var("WARDEN_SHARED_SECRET", "test-secret");
        env::remove_var("WARDEN_RATE_WINDOW_SECS");
        env::remove_var("WARDEN_RATE_MAX_REQUESTS");

        let config = GuardConfig::load().unwrap();
        assert_eq!(config.rate_limit_window_secs, 60);
        assert_eq!(config.rate_limit_max_requests, 100);

        let auth = config.authorizer();
        assert!(auth.authorize(Some("test-secret")).is_ok());
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let _env = ENV_LOCK.lock();
        env::set_var("WARDEN_SHARED_SECRET", "test-secret");
        env::set_var("WARDEN_RATE_WINDOW_SECS", "30");
        env::set_var("WARDEN_RATE_MAX_REQUESTS", "5");

        let config = GuardConfig::load().unwrap();
        assert_eq!(config.rate_limit_window_secs, 30);
        assert_eq!(config.rate_limit_max_requests, 5);

        env::set_var("WARDEN_RATE_WINDOW_SECS", "not-a-number");
        let err = GuardConfig::load().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue("WARDEN_RATE_WINDOW_SECS".to_string())
        );

        env::set_var("WARDEN_RATE_WINDOW_SECS", "0");
        let err = GuardConfig::load().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue("WARDEN_RATE_WINDOW_SECS".to_string())
        );

        env::remove_var("WARDEN_RATE_WINDOW_SECS");
        env::remove_var("WARDEN_RATE_MAX_REQUESTS");
    }

    #[test]
    fn test_missing_secret_is_a_hard_error() {
        let _env = ENV_LOCK.lock();
        env::remove_var("WARDEN_SHARED_SECRET");

        let err = GuardConfig::load().unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingRequired("WARDEN_SHARED_SECRET".to_string())
        );
    }
}
