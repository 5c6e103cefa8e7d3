//! # warden-db: Entity Store for Warden
//!
//! This crate provides the storage layer for the Warden access-control core.
//! It uses SQLite for embedded storage with sqlx for async operations, and it
//! is where the structural invariants are enforced:
//!
//! - natural-key uniqueness scoped to live records (role name, page name,
//!   permission (role, page) pair, address (user, line) pair)
//! - at most one default address per user, with per-user serialization
//! - soft delete as pure mutation: deleted records are excluded from every
//!   active view but never removed
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - The caller-facing error taxonomy
//! - [`lock`] - Identity-scoped lock map
//! - [`repository`] - Repository implementations (role, page, permission, address)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/warden.db")).await?;
//!
//! // Effective capability list for a role
//! let matrix = db.permissions().resolve_for_role(&role_id).await?;
//!
//! // Default-address toggle, serialized per user
//! let addr = db.addresses().set_default(&address_id, &actor).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lock;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::address::AddressRepository;
pub use repository::page::PageRepository;
pub use repository::permission::PermissionRepository;
pub use repository::role::RoleRepository;
