//! # Address Repository
//!
//! Database operations for user addresses, including the default-address
//! resolver.
//!
//! ## The One-Default Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 set_default(address_id, actor)                      │
//! │                                                                     │
//! │  1. Load target: absent/deleted → NotFound, inactive → InvalidState │
//! │  2. Acquire the per-user lock (KeyedMutex, not a global lock)       │
//! │  3. Open a transaction and reload the target inside it              │
//! │  4. Already default?  → toggle it OFF (toggle semantics)            │
//! │     Currently off?    → demote every other live address of the      │
//! │                         user, then promote the target               │
//! │  5. Commit; return the updated target only                          │
//! │                                                                     │
//! │  Two simultaneous calls for the same user serialize at step 2,     │
//! │  so they can never both end up default. The partial unique index   │
//! │  idx_addresses_live_default backs the whole dance up at the        │
//! │  storage layer.                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Address-Line Uniqueness
//! The first address line is unique *per user* among live rows. Two users
//! sharing a street address is legitimate; the same user entering the same
//! line twice is a duplicate.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::lock::KeyedMutex;
use warden_core::validation::{
    validate_actor, validate_coordinates, validate_optional_text, validate_text,
};
use warden_core::{Address, AddressUpdate, Lifecycle, NewAddress};

/// Repository for address database operations.
#[derive(Debug, Clone)]
pub struct AddressRepository {
    pool: SqlitePool,
    /// Per-user serialization for default-address changes. Shared across all
    /// repositories handed out by the same [`crate::pool::Database`].
    locks: Arc<KeyedMutex>,
}

impl AddressRepository {
    /// Creates a new AddressRepository.
    pub fn new(pool: SqlitePool, locks: Arc<KeyedMutex>) -> Self {
        AddressRepository { pool, locks }
    }

    /// Lists all live addresses.
    pub async fn list(&self) -> DbResult<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, user_id, location_id, pincode_id, address_line1, address_line2,
                   city, pincode, latitude, longitude, map_url, address_type,
                   is_default, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM addresses
            WHERE state <> 'deleted'
            ORDER BY added_on
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses)
    }

    /// Lists a user's live addresses, oldest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, user_id, location_id, pincode_id, address_line1, address_line2,
                   city, pincode, latitude, longitude, map_url, address_type,
                   is_default, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM addresses
            WHERE user_id = ?1 AND state <> 'deleted'
            ORDER BY added_on
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses)
    }

    /// Gets a live address by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Address> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, user_id, location_id, pincode_id, address_line1, address_line2,
                   city, pincode, latitude, longitude, map_url, address_type,
                   is_default, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM addresses
            WHERE id = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        address.ok_or_else(|| DbError::not_found("Address", id))
    }

    /// Gets an address by id including soft-deleted rows.
    pub async fn get_by_id_any(&self, id: &str) -> DbResult<Address> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, user_id, location_id, pincode_id, address_line1, address_line2,
                   city, pincode, latitude, longitude, map_url, address_type,
                   is_default, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM addresses
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        address.ok_or_else(|| DbError::not_found("Address", id))
    }

    /// Gets a user's live address with the given first line, if one exists.
    pub async fn get_by_line(&self, user_id: &str, address_line1: &str) -> DbResult<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, user_id, location_id, pincode_id, address_line1, address_line2,
                   city, pincode, latitude, longitude, map_url, address_type,
                   is_default, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM addresses
            WHERE user_id = ?1 AND address_line1 = ?2 AND state <> 'deleted'
            "#,
        )
        .bind(user_id)
        .bind(address_line1)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    /// Creates a new address.
    ///
    /// When the payload asks for `is_default = true`, any current default of
    /// the user is demoted in the same transaction, under the per-user lock.
    ///
    /// ## Returns
    /// * `Err(DbError::Conflict)` - the user already has a live address with
    ///   this first line
    pub async fn create(&self, new: &NewAddress, actor: &str) -> DbResult<Address> {
        validate_actor(actor)?;
        validate_text("user_id", &new.user_id)?;
        validate_text("address_line1", &new.address_line1)?;
        validate_optional_text("address_line2", new.address_line2.as_deref())?;
        validate_text("city", &new.city)?;
        validate_text("pincode", &new.pincode)?;
        validate_text("address_type", &new.address_type)?;
        validate_optional_text("map_url", new.map_url.as_deref())?;
        validate_coordinates(new.latitude, new.longitude)?;

        if self
            .get_by_line(&new.user_id, &new.address_line1)
            .await?
            .is_some()
        {
            return Err(DbError::conflict("address line", &new.address_line1));
        }

        let now = Utc::now();
        let address = Address {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id.clone(),
            location_id: new.location_id.clone(),
            pincode_id: new.pincode_id.clone(),
            address_line1: new.address_line1.clone(),
            address_line2: new.address_line2.clone(),
            city: new.city.clone(),
            pincode: new.pincode.clone(),
            latitude: new.latitude,
            longitude: new.longitude,
            map_url: new.map_url.clone(),
            address_type: new.address_type.clone(),
            is_default: new.is_default,
            state: Lifecycle::Active,
            added_by: actor.to_string(),
            added_on: now,
            modified_by: actor.to_string(),
            modified_on: now,
            deleted_by: None,
            deleted_on: None,
        };

        debug!(id = %address.id, user_id = %address.user_id, "Creating address");

        if address.is_default {
            // Demote-then-insert must be atomic and serialized per user.
            let lock = self.locks.get(&address.user_id);
            let _guard = lock.lock().await;

            let mut tx = self.pool.begin().await?;

            sqlx::query(
                r#"
                UPDATE addresses SET
                    is_default = 0,
                    modified_by = ?2,
                    modified_on = ?3
                WHERE user_id = ?1 AND is_default = 1 AND state <> 'deleted'
                "#,
            )
            .bind(&address.user_id)
            .bind(actor)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            Self::insert(&mut tx, &address).await?;
            tx.commit().await?;
        } else {
            let mut tx = self.pool.begin().await?;
            Self::insert(&mut tx, &address).await?;
            tx.commit().await?;
        }

        Ok(address)
    }

    /// Updates an address. Only fields present in the patch change; the
    /// default flag is out of scope here (see [`Self::set_default`]).
    ///
    /// Changing the first line re-checks per-user uniqueness; keeping the
    /// current line is always allowed.
    pub async fn update(&self, id: &str, patch: &AddressUpdate, actor: &str) -> DbResult<Address> {
        validate_actor(actor)?;

        let mut address = self.get_by_id(id).await?;

        if let Some(line1) = &patch.address_line1 {
            validate_text("address_line1", line1)?;
            if let Some(holder) = self.get_by_line(&address.user_id, line1).await? {
                if holder.id != address.id {
                    return Err(DbError::conflict("address line", line1));
                }
            }
            address.address_line1 = line1.clone();
        }
        if let Some(line2) = &patch.address_line2 {
            validate_optional_text("address_line2", Some(line2))?;
            address.address_line2 = Some(line2.clone());
        }
        if let Some(city) = &patch.city {
            validate_text("city", city)?;
            address.city = city.clone();
        }
        if let Some(pincode) = &patch.pincode {
            validate_text("pincode", pincode)?;
            address.pincode = pincode.clone();
        }
        if let Some(latitude) = patch.latitude {
            address.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            address.longitude = longitude;
        }
        validate_coordinates(address.latitude, address.longitude)?;
        if let Some(map_url) = &patch.map_url {
            validate_optional_text("map_url", Some(map_url))?;
            address.map_url = Some(map_url.clone());
        }
        if let Some(address_type) = &patch.address_type {
            validate_text("address_type", address_type)?;
            address.address_type = address_type.clone();
        }

        address.modified_by = actor.to_string();
        address.modified_on = Utc::now();

        debug!(id = %address.id, "Updating address");

        let result = sqlx::query(
            r#"
            UPDATE addresses SET
                address_line1 = ?2,
                address_line2 = ?3,
                city = ?4,
                pincode = ?5,
                latitude = ?6,
                longitude = ?7,
                map_url = ?8,
                address_type = ?9,
                modified_by = ?10,
                modified_on = ?11
            WHERE id = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(&address.id)
        .bind(&address.address_line1)
        .bind(&address.address_line2)
        .bind(&address.city)
        .bind(&address.pincode)
        .bind(address.latitude)
        .bind(address.longitude)
        .bind(&address.map_url)
        .bind(&address.address_type)
        .bind(&address.modified_by)
        .bind(address.modified_on)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Address", id));
        }

        Ok(address)
    }

    /// Soft-deletes an address.
    pub async fn soft_delete(&self, id: &str, actor: &str) -> DbResult<Address> {
        validate_actor(actor)?;

        let mut address = self.get_by_id(id).await?;
        let now = Utc::now();

        debug!(id = %id, "Soft-deleting address");

        let result = sqlx::query(
            r#"
            UPDATE addresses SET
                state = 'deleted',
                deleted_by = ?2,
                deleted_on = ?3,
                modified_by = ?2,
                modified_on = ?3
            WHERE id = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(id)
        .bind(actor)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Address", id));
        }

        address.state = Lifecycle::Deleted;
        address.deleted_by = Some(actor.to_string());
        address.deleted_on = Some(now);
        address.modified_by = actor.to_string();
        address.modified_on = now;

        Ok(address)
    }

    /// Restores an address to the active state, flipping only the state.
    ///
    /// If the user meanwhile created a live address with the same first line,
    /// or the restored row would be a second default, the partial unique
    /// indexes reject the restore as [`DbError::Conflict`].
    pub async fn activate(&self, id: &str, actor: &str) -> DbResult<Address> {
        validate_actor(actor)?;

        let mut address = self.get_by_id_any(id).await?;
        let now = Utc::now();

        debug!(id = %id, "Activating address");

        sqlx::query(
            r#"
            UPDATE addresses SET
                state = 'active',
                modified_by = ?2,
                modified_on = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(actor)
        .bind(now)
        .execute(&self.pool)
        .await?;

        address.state = Lifecycle::Active;
        address.modified_by = actor.to_string();
        address.modified_on = now;

        Ok(address)
    }

    /// Switches a live address off without deleting it.
    ///
    /// An inactive address keeps its line reserved but cannot be made the
    /// default until reactivated.
    pub async fn deactivate(&self, id: &str, actor: &str) -> DbResult<Address> {
        validate_actor(actor)?;

        let mut address = self.get_by_id(id).await?;
        let now = Utc::now();

        debug!(id = %id, "Deactivating address");

        let result = sqlx::query(
            r#"
            UPDATE addresses SET
                state = 'inactive',
                modified_by = ?2,
                modified_on = ?3
            WHERE id = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(id)
        .bind(actor)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Address", id));
        }

        address.state = Lifecycle::Inactive;
        address.modified_by = actor.to_string();
        address.modified_on = now;

        Ok(address)
    }

    /// Toggles the default flag on an address.
    ///
    /// Calling this flips the current state rather than unconditionally
    /// setting it: a second call on the same address turns the default off
    /// again. Promotion demotes every other live address of the user inside
    /// the same transaction; the whole operation is serialized per user.
    ///
    /// ## Returns
    /// The updated target address - never the demoted siblings.
    ///
    /// * `Err(DbError::NotFound)` - target absent or soft-deleted
    /// * `Err(DbError::InvalidState)` - target is deactivated
    pub async fn set_default(&self, id: &str, actor: &str) -> DbResult<Address> {
        validate_actor(actor)?;

        // Probe outside the lock just to learn the owning user; the
        // authoritative read happens again inside the lock + transaction.
        let probe = self.get_by_id(id).await?;

        let lock = self.locks.get(&probe.user_id);
        let _guard = lock.lock().await;

        let mut tx = self.pool.begin().await?;

        let address = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, user_id, location_id, pincode_id, address_line1, address_line2,
                   city, pincode, latitude, longitude, map_url, address_type,
                   is_default, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM addresses
            WHERE id = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut address = address.ok_or_else(|| DbError::not_found("Address", id))?;

        if address.state == Lifecycle::Inactive {
            return Err(DbError::invalid_state(
                "Address",
                "a deactivated address cannot be the default",
            ));
        }

        let now = Utc::now();

        if address.is_default {
            debug!(id = %id, user_id = %address.user_id, "Toggling default address off");

            sqlx::query(
                r#"
                UPDATE addresses SET
                    is_default = 0,
                    modified_by = ?2,
                    modified_on = ?3
                WHERE id = ?1
                "#,
            )
            .bind(id)
            .bind(actor)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            address.is_default = false;
        } else {
            debug!(id = %id, user_id = %address.user_id, "Promoting default address");

            // Demote first so the one-default index is satisfied throughout.
            sqlx::query(
                r#"
                UPDATE addresses SET
                    is_default = 0,
                    modified_by = ?2,
                    modified_on = ?3
                WHERE user_id = ?1 AND is_default = 1 AND state <> 'deleted'
                "#,
            )
            .bind(&address.user_id)
            .bind(actor)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE addresses SET
                    is_default = 1,
                    modified_by = ?2,
                    modified_on = ?3
                WHERE id = ?1
                "#,
            )
            .bind(id)
            .bind(actor)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            address.is_default = true;
        }

        tx.commit().await?;

        address.modified_by = actor.to_string();
        address.modified_on = now;

        Ok(address)
    }

    /// Counts a user's live default addresses (diagnostics; 0 or 1 by
    /// invariant).
    pub async fn count_defaults(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM addresses WHERE user_id = ?1 AND is_default = 1 AND state <> 'deleted'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        address: &Address,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO addresses (
                id, user_id, location_id, pincode_id, address_line1, address_line2,
                city, pincode, latitude, longitude, map_url, address_type,
                is_default, state,
                added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14,
                ?15, ?16, ?17, ?18, ?19, ?20
            )
            "#,
        )
        .bind(&address.id)
        .bind(&address.user_id)
        .bind(&address.location_id)
        .bind(&address.pincode_id)
        .bind(&address.address_line1)
        .bind(&address.address_line2)
        .bind(&address.city)
        .bind(&address.pincode)
        .bind(address.latitude)
        .bind(address.longitude)
        .bind(&address.map_url)
        .bind(&address.address_type)
        .bind(address.is_default)
        .bind(address.state)
        .bind(&address.added_by)
        .bind(address.added_on)
        .bind(&address.modified_by)
        .bind(address.modified_on)
        .bind(&address.deleted_by)
        .bind(address.deleted_on)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn home(user_id: &str, line1: &str) -> NewAddress {
        NewAddress {
            user_id: user_id.to_string(),
            location_id: "loc-1".to_string(),
            pincode_id: "pin-1".to_string(),
            address_line1: line1.to_string(),
            address_line2: None,
            city: "Pune".to_string(),
            pincode: "411001".to_string(),
            latitude: 18.52,
            longitude: 73.85,
            map_url: None,
            address_type: "Home".to_string(),
            is_default: false,
        }
    }

    #[tokio::test]
    async fn test_line_unique_per_user_not_globally() {
        let db = test_db().await;
        let repo = db.addresses();

        repo.create(&home("u-1", "12 Baker St"), "u-1").await.unwrap();

        // Same user, same line: duplicate.
        let err = repo
            .create(&home("u-1", "12 Baker St"), "u-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        // A different user may legitimately live at the same address.
        repo.create(&home("u-2", "12 Baker St"), "u-2").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_line_self_collision_is_allowed() {
        let db = test_db().await;
        let repo = db.addresses();

        let a = repo.create(&home("u-1", "12 Baker St"), "u-1").await.unwrap();
        let b = repo.create(&home("u-1", "221b Baker St"), "u-1").await.unwrap();

        // Re-saving with its own line succeeds.
        let patch = AddressUpdate {
            address_line1: Some("12 Baker St".to_string()),
            city: Some("London".to_string()),
            ..Default::default()
        };
        let updated = repo.update(&a.id, &patch, "u-1").await.unwrap();
        assert_eq!(updated.city, "London");

        // Taking a sibling's line does not.
        let patch = AddressUpdate {
            address_line1: Some("12 Baker St".to_string()),
            ..Default::default()
        };
        let err = repo.update(&b.id, &patch, "u-1").await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_set_default_promotes_and_demotes() {
        let db = test_db().await;
        let repo = db.addresses();

        let a = repo.create(&home("u-1", "Line A"), "u-1").await.unwrap();
        let b = repo.create(&home("u-1", "Line B"), "u-1").await.unwrap();

        let a = repo.set_default(&a.id, "u-1").await.unwrap();
        assert!(a.is_default);
        assert_eq!(repo.count_defaults("u-1").await.unwrap(), 1);

        // Promoting b demotes a in the same transaction.
        let b = repo.set_default(&b.id, "u-1").await.unwrap();
        assert!(b.is_default);
        assert!(!repo.get_by_id(&a.id).await.unwrap().is_default);
        assert_eq!(repo.count_defaults("u-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_default_toggles_off() {
        let db = test_db().await;
        let repo = db.addresses();

        let a = repo.create(&home("u-1", "Line A"), "u-1").await.unwrap();

        // First call turns it on, the second toggles it off again.
        let on = repo.set_default(&a.id, "u-1").await.unwrap();
        assert!(on.is_default);

        let off = repo.set_default(&a.id, "u-1").await.unwrap();
        assert!(!off.is_default);
        assert_eq!(repo.count_defaults("u-1").await.unwrap(), 0);

        // Never more than one default, whatever the call sequence.
        repo.set_default(&a.id, "u-1").await.unwrap();
        repo.set_default(&a.id, "u-1").await.unwrap();
        assert!(repo.count_defaults("u-1").await.unwrap() <= 1);
    }

    #[tokio::test]
    async fn test_set_default_rejects_deleted_and_inactive() {
        let db = test_db().await;
        let repo = db.addresses();

        let a = repo.create(&home("u-1", "Line A"), "u-1").await.unwrap();
        repo.deactivate(&a.id, "u-1").await.unwrap();
        let err = repo.set_default(&a.id, "u-1").await.unwrap_err();
        assert!(matches!(err, DbError::InvalidState { .. }));

        let b = repo.create(&home("u-1", "Line B"), "u-1").await.unwrap();
        repo.soft_delete(&b.id, "u-1").await.unwrap();
        let err = repo.set_default(&b.id, "u-1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_as_default_demotes_existing() {
        let db = test_db().await;
        let repo = db.addresses();

        let a = repo.create(&home("u-1", "Line A"), "u-1").await.unwrap();
        repo.set_default(&a.id, "u-1").await.unwrap();

        let mut payload = home("u-1", "Line B");
        payload.is_default = true;
        let b = repo.create(&payload, "u-1").await.unwrap();

        assert!(b.is_default);
        assert!(!repo.get_by_id(&a.id).await.unwrap().is_default);
        assert_eq!(repo.count_defaults("u-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_defaults_are_per_user() {
        let db = test_db().await;
        let repo = db.addresses();

        let a = repo.create(&home("u-1", "Line A"), "u-1").await.unwrap();
        let b = repo.create(&home("u-2", "Line B"), "u-2").await.unwrap();

        repo.set_default(&a.id, "u-1").await.unwrap();
        repo.set_default(&b.id, "u-2").await.unwrap();

        // One default each; promoting u-2's address never touched u-1's.
        assert!(repo.get_by_id(&a.id).await.unwrap().is_default);
        assert!(repo.get_by_id(&b.id).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn test_concurrent_set_default_keeps_invariant() {
        let db = test_db().await;

        let a = db
            .addresses()
            .create(&home("u-1", "Line A"), "u-1")
            .await
            .unwrap();
        let b = db
            .addresses()
            .create(&home("u-1", "Line B"), "u-1")
            .await
            .unwrap();

        let mut handles = Vec::new();
        for id in [a.id.clone(), b.id.clone(), a.id.clone(), b.id.clone()] {
            let repo = db.addresses();
            handles.push(tokio::spawn(async move {
                repo.set_default(&id, "u-1").await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert!(db.addresses().count_defaults("u-1").await.unwrap() <= 1);
    }

    #[tokio::test]
    async fn test_soft_deleted_address_leaves_live_views() {
        let db = test_db().await;
        let repo = db.addresses();

        let a = repo.create(&home("u-1", "Line A"), "u-1").await.unwrap();
        repo.soft_delete(&a.id, "u-1").await.unwrap();

        assert!(repo.list_for_user("u-1").await.unwrap().is_empty());
        assert!(matches!(
            repo.get_by_id(&a.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));

        // Delete metadata is preserved on the row itself.
        let any = repo.get_by_id_any(&a.id).await.unwrap();
        assert_eq!(any.deleted_by.as_deref(), Some("u-1"));

        // The line is free for a new address now.
        repo.create(&home("u-1", "Line A"), "u-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_coordinates_rejected() {
        let db = test_db().await;
        let repo = db.addresses();

        let mut payload = home("u-1", "Line A");
        payload.latitude = 123.0;
        let err = repo.create(&payload, "u-1").await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }
}
