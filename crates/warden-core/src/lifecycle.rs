//! # Record Lifecycle
//!
//! Every Warden record carries a single lifecycle state instead of the
//! ad hoc pair of `is_active`/`is_deleted` flags that tends to grow on
//! soft-deletable schemas. The predicate "is this record live" is defined
//! here, once, and nowhere else.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Lifecycle Transitions                          │
//! │                                                                     │
//! │              deactivate                soft_delete                  │
//! │   ┌────────┐ ─────────► ┌──────────┐  ─────────►  ┌─────────┐      │
//! │   │ Active │            │ Inactive │              │ Deleted │      │
//! │   └────────┘ ◄───────── └──────────┘  ◄─────────  └─────────┘      │
//! │               activate                  activate                    │
//! │                                                                     │
//! │   Live  = Active | Inactive   (occupies natural keys, joinable)    │
//! │   Dead  = Deleted             (invisible to every active view)     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deletion is pure mutation: a `Deleted` record keeps every field it had,
//! plus `deleted_by`/`deleted_on`, and can be restored by flipping the state
//! back to `Active`.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a soft-deletable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Record is in normal use.
    Active,
    /// Record is switched off but still occupies its natural key.
    Inactive,
    /// Record is soft-deleted: invisible to active views, never removed.
    Deleted,
}

impl Lifecycle {
    /// A record is live unless it has been soft-deleted.
    ///
    /// Live records participate in uniqueness checks, joins, and the
    /// default-address invariant; deleted records participate in nothing.
    #[inline]
    pub const fn is_live(self) -> bool {
        !matches!(self, Lifecycle::Deleted)
    }

    /// Stable textual form, matching the database encoding.
    pub const fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Active => "active",
            Lifecycle::Inactive => "inactive",
            Lifecycle::Deleted => "deleted",
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle::Active
    }
}

/// Implemented by every record that carries a [`Lifecycle`].
///
/// Repositories and resolvers go through this trait rather than reading
/// per-entity flags, so the liveness predicate cannot drift between entities.
pub trait Lifecycled {
    /// Current lifecycle state.
    fn lifecycle(&self) -> Lifecycle;

    /// Not soft-deleted.
    fn is_live(&self) -> bool {
        self.lifecycle().is_live()
    }

    /// Live and switched on.
    fn is_active(&self) -> bool {
        self.lifecycle() == Lifecycle::Active
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(Lifecycle);

    impl Lifecycled for Probe {
        fn lifecycle(&self) -> Lifecycle {
            self.0
        }
    }

    #[test]
    fn test_liveness() {
        assert!(Lifecycle::Active.is_live());
        assert!(Lifecycle::Inactive.is_live());
        assert!(!Lifecycle::Deleted.is_live());
    }

    #[test]
    fn test_trait_predicates() {
        assert!(Probe(Lifecycle::Active).is_active());
        assert!(Probe(Lifecycle::Inactive).is_live());
        assert!(!Probe(Lifecycle::Inactive).is_active());
        assert!(!Probe(Lifecycle::Deleted).is_live());
    }

    #[test]
    fn test_default_is_active() {
        assert_eq!(Lifecycle::default(), Lifecycle::Active);
    }

    #[test]
    fn test_serde_encoding() {
        let json = serde_json::to_string(&Lifecycle::Deleted).unwrap();
        assert_eq!(json, "\"deleted\"");
        assert_eq!(Lifecycle::Deleted.as_str(), "deleted");
    }
}
