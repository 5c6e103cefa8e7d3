//! # Domain Types
//!
//! Core domain records for Warden and the payloads used to create and
//! update them.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Records                              │
//! │                                                                     │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐        │
//! │  │     Role     │   │     Page     │   │    Permission    │        │
//! │  │ ───────────  │   │ ───────────  │   │ ───────────────  │        │
//! │  │ id (UUID)    │   │ id (UUID)    │   │ id (UUID)        │        │
//! │  │ name (uniq)  │   │ name (uniq)  │   │ role_id, page_id │        │
//! │  │ default_page │   │ parent tree  │   │ can_view/create/ │        │
//! │  │ is_member    │   │ is_internal  │   │ update/delete    │        │
//! │  └──────────────┘   └──────────────┘   └──────────────────┘        │
//! │                                                                     │
//! │  ┌──────────────────────────────────────────────────────────┐      │
//! │  │                       Address                            │      │
//! │  │  per-user, at most one default among live rows,          │      │
//! │  │  address line unique per user                            │      │
//! │  └──────────────────────────────────────────────────────────┘      │
//! │                                                                     │
//! │  Every record: Lifecycle state + full audit trail.                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Relationships
//! Records reference each other by id only; nothing holds a live reference
//! to another record. Joins happen at read time in the store.
//!
//! ## Partial Updates
//! The `*Update` payloads carry `Option` per field: `None` leaves the field
//! untouched, `Some` replaces it. There is no full-replace path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::{Lifecycle, Lifecycled};

// =============================================================================
// Role
// =============================================================================

/// A named category of user that determines the default permission set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Role {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Role name - unique among live roles.
    pub name: String,

    /// Optional human-readable description.
    pub description: Option<String>,

    /// Page the role lands on after sign-in.
    pub default_page: Option<String>,

    /// Whether users of this role are members (as opposed to staff).
    pub is_member: bool,

    /// Lifecycle state (soft delete, deactivation).
    pub state: Lifecycle,

    pub added_by: String,
    pub added_on: DateTime<Utc>,
    pub modified_by: String,
    pub modified_on: DateTime<Utc>,
    pub deleted_by: Option<String>,
    pub deleted_on: Option<DateTime<Utc>>,
}

impl Lifecycled for Role {
    fn lifecycle(&self) -> Lifecycle {
        self.state
    }
}

/// Payload for creating a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub description: Option<String>,
    pub default_page: Option<String>,
    pub is_member: bool,
}

/// Partial-update payload for a role. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub default_page: Option<String>,
    pub is_member: Option<bool>,
}

// =============================================================================
// Page
// =============================================================================

/// An addressable application view whose access is governed by permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Page {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Page name - unique among live pages.
    pub name: String,

    /// Text shown in navigation.
    pub display_text: String,

    /// Navigation target, if the page is directly reachable.
    pub navigation_url: Option<String>,

    /// Parent page id for the navigation tree. The tree is kept acyclic:
    /// writes that would make a page its own ancestor are rejected.
    pub parent_page_id: Option<String>,

    /// Internal pages render inside the application shell; external ones
    /// link out.
    pub is_internal: bool,

    pub state: Lifecycle,

    pub added_by: String,
    pub added_on: DateTime<Utc>,
    pub modified_by: String,
    pub modified_on: DateTime<Utc>,
    pub deleted_by: Option<String>,
    pub deleted_on: Option<DateTime<Utc>>,
}

impl Lifecycled for Page {
    fn lifecycle(&self) -> Lifecycle {
        self.state
    }
}

/// Payload for creating a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPage {
    pub name: String,
    pub display_text: String,
    pub navigation_url: Option<String>,
    pub parent_page_id: Option<String>,
    pub is_internal: bool,
}

/// Partial-update payload for a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageUpdate {
    pub name: Option<String>,
    pub display_text: Option<String>,
    pub navigation_url: Option<String>,
    pub parent_page_id: Option<String>,
    pub is_internal: Option<bool>,
}

// =============================================================================
// Permission
// =============================================================================

/// The CRUD capability tuple granted to a role for a page.
///
/// At most one live permission exists per (role, page) pair; the pair is the
/// natural key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Permission {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub role_id: String,
    pub page_id: String,

    pub can_view: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,

    pub state: Lifecycle,

    pub added_by: String,
    pub added_on: DateTime<Utc>,
    pub modified_by: String,
    pub modified_on: DateTime<Utc>,
    pub deleted_by: Option<String>,
    pub deleted_on: Option<DateTime<Utc>>,
}

impl Lifecycled for Permission {
    fn lifecycle(&self) -> Lifecycle {
        self.state
    }
}

/// Payload for creating a permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPermission {
    pub role_id: String,
    pub page_id: String,
    pub can_view: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

/// Partial-update payload for a permission.
///
/// Re-pointing `role_id`/`page_id` re-checks the (role, page) natural key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionUpdate {
    pub role_id: Option<String>,
    pub page_id: Option<String>,
    pub can_view: Option<bool>,
    pub can_create: Option<bool>,
    pub can_update: Option<bool>,
    pub can_delete: Option<bool>,
}

/// One row of the effective capability list for a role: a live permission
/// joined with its live page.
///
/// Produced by the permission matrix resolver; rows whose page has been
/// deleted never appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PagePermission {
    pub permission_id: String,
    pub role_id: String,
    pub page_id: String,
    pub page_name: String,
    pub page_display_text: String,
    pub page_navigation_url: Option<String>,
    pub parent_page_id: Option<String>,
    pub is_internal: bool,
    pub can_view: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

/// Administrative listing row: permission joined with page and role metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PermissionDetail {
    pub permission_id: String,
    pub role_id: String,
    pub role_name: String,
    pub page_id: String,
    pub page_name: String,
    pub page_display_text: String,
    pub page_navigation_url: Option<String>,
    pub is_internal: bool,
    pub can_view: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

// =============================================================================
// Address
// =============================================================================

/// A user's delivery/contact address.
///
/// Among a user's live addresses, at most one carries `is_default = true`,
/// and the first address line is unique per user. Both invariants are
/// enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Address {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning user. Users themselves live outside this workspace.
    pub user_id: String,

    /// Location master reference.
    pub location_id: String,

    /// Serviceable-pincode reference.
    pub pincode_id: String,

    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub pincode: String,

    pub latitude: f64,
    pub longitude: f64,
    pub map_url: Option<String>,

    /// Free-form kind tag: "Home", "Office", ...
    pub address_type: String,

    /// The single primary address among the user's live addresses.
    /// Mutated only through the set-default resolver.
    pub is_default: bool,

    pub state: Lifecycle,

    pub added_by: String,
    pub added_on: DateTime<Utc>,
    pub modified_by: String,
    pub modified_on: DateTime<Utc>,
    pub deleted_by: Option<String>,
    pub deleted_on: Option<DateTime<Utc>>,
}

impl Lifecycled for Address {
    fn lifecycle(&self) -> Lifecycle {
        self.state
    }
}

/// Payload for creating an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAddress {
    pub user_id: String,
    pub location_id: String,
    pub pincode_id: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub pincode: String,
    pub latitude: f64,
    pub longitude: f64,
    pub map_url: Option<String>,
    pub address_type: String,
    /// Create as the user's default. The store demotes any current default
    /// in the same transaction.
    pub is_default: bool,
}

/// Partial-update payload for an address.
///
/// The default flag is deliberately absent: it only changes through the
/// set-default resolver so the one-default invariant stays in one code path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressUpdate {
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub map_url: Option<String>,
    pub address_type: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_role() -> Role {
        let now = Utc::now();
        Role {
            id: "r-1".to_string(),
            name: "Admin".to_string(),
            description: None,
            default_page: Some("dashboard".to_string()),
            is_member: false,
            state: Lifecycle::Active,
            added_by: "u-1".to_string(),
            added_on: now,
            modified_by: "u-1".to_string(),
            modified_on: now,
            deleted_by: None,
            deleted_on: None,
        }
    }

    #[test]
    fn test_lifecycled_is_uniform_across_entities() {
        let mut role = sample_role();
        assert!(role.is_active());

        role.state = Lifecycle::Deleted;
        assert!(!role.is_live());
    }

    #[test]
    fn test_update_payload_defaults_touch_nothing() {
        let patch = RoleUpdate::default();
        assert!(patch.name.is_none());
        assert!(patch.description.is_none());
        assert!(patch.default_page.is_none());
        assert!(patch.is_member.is_none());
    }

    #[test]
    fn test_role_serde_roundtrip() {
        let role = sample_role();
        let json = serde_json::to_string(&role).unwrap();
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, role.id);
        assert_eq!(back.state, Lifecycle::Active);
    }
}
