//! # warden-core: Pure Domain Rules for Warden
//!
//! This crate is the **heart** of Warden. It defines the records the access
//! control layer reasons about and the rules that are true of them regardless
//! of storage: what a role, page, permission, and address look like, what
//! "deleted" means, and what input is acceptable.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Warden Architecture                           │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │            Callers (HTTP routers, admin tooling)            │   │
//! │  │   pass validated input + actor id through plain fn calls    │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │              ★ warden-core (THIS CRATE) ★                   │   │
//! │  │                                                             │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐              │   │
//! │  │   │   types   │  │ lifecycle │  │ validation│              │   │
//! │  │   │ Role,Page │  │  Active/  │  │   rules   │              │   │
//! │  │   │ Permission│  │  Deleted  │  │   checks  │              │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘              │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │                 warden-db (Entity Store)                    │   │
//! │  │          SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Role, Page, Permission, Address) and payloads
//! - [`lifecycle`] - The unified Active/Inactive/Deleted record state
//! - [`error`] - Validation error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **One lifecycle**: "is this record live" is answered in exactly one place
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use warden_core::Role` instead of
// `use warden_core::types::Role`

pub use error::ValidationError;
pub use lifecycle::{Lifecycle, Lifecycled};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a role or page name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of free-text fields (descriptions, address lines, URLs).
pub const MAX_TEXT_LEN: usize = 255;

/// Maximum depth walked when validating the page hierarchy.
///
/// A chain longer than this is treated as structurally broken rather than
/// walked forever.
pub const MAX_PAGE_DEPTH: usize = 64;
