//! # warden-guard: Request Fingerprinting and Rate Limiting
//!
//! Best-effort security telemetry for the Warden core. This crate answers
//! three questions about an inbound caller:
//!
//! 1. **Who does this look like?** - a deterministic fingerprint over client
//!    attributes ([`fingerprint`])
//! 2. **Is it calling too often?** - a sliding-window rate limiter keyed by
//!    resolved IP + endpoint ([`rate_limit`])
//! 3. **Did it present the shared secret?** - a pluggable [`auth::Authorizer`]
//!    checked once at the boundary instead of ad hoc comparisons scattered
//!    across handlers
//!
//! ## Availability Over Strictness
//! Fingerprinting and rate limiting never fail a request on malformed or
//! missing headers: absent attributes degrade to empty strings, and a limiter
//! key is always derivable. Only the authorizer rejects.
//!
//! ## Modules
//!
//! - [`fingerprint`] - Client attributes, IP resolution, digest, access log
//! - [`rate_limit`] - Sliding-window limiter with striped, owned state
//! - [`auth`] - The `Authorizer` trait and shared-secret implementation
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Guard error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod rate_limit;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{Authorizer, SharedSecretAuthorizer};
pub use config::{ConfigError, GuardConfig};
pub use error::GuardError;
pub use fingerprint::{fingerprint, log_access, resolve_ip, ClientAttributes};
pub use rate_limit::{identity_key, RateLimiter};
