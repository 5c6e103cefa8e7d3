//! # Repository Module
//!
//! Repository implementations for the Warden entity store.
//!
//! Each repository owns the SQL for one entity and shares the same contract:
//!
//! - `create(payload, actor)` - uniqueness-checked insert, returns the record
//! - `get_by_id(id)` - live records only; `get_by_id_any(id)` includes deleted
//! - `list()` - live records; `list_active()` - active only
//! - `update(id, patch, actor)` - partial update, self-collision allowed
//! - `soft_delete(id, actor)` - flips state, stamps deleted_by/on, keeps data
//! - `activate(id, actor)` - restores, flipping only the state
//!
//! Every mutating call takes an explicit actor id for the audit trail; the
//! actor is never inferred from data state.
//!
//! ## Available Repositories
//!
//! - [`role::RoleRepository`] - Role CRUD and lifecycle
//! - [`page::PageRepository`] - Page CRUD and hierarchy validation
//! - [`permission::PermissionRepository`] - Permission CRUD and matrix resolution
//! - [`address::AddressRepository`] - Address CRUD and the default-address resolver

pub mod address;
pub mod page;
pub mod permission;
pub mod role;
