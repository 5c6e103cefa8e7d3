//! # Role Repository
//!
//! Database operations for roles.
//!
//! ## Key Invariant
//! At most one live role per name. Creates and renames are checked against
//! live rows first (so the error can name the offending key), and the
//! partial unique index `idx_roles_live_name` backs the check up against
//! races - a colliding concurrent insert surfaces as [`DbError::Conflict`]
//! through the driver-error mapping.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use warden_core::validation::{validate_actor, validate_name, validate_optional_text};
use warden_core::{Lifecycle, NewRole, Role, RoleUpdate};

/// Repository for role database operations.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: SqlitePool,
}

impl RoleRepository {
    /// Creates a new RoleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RoleRepository { pool }
    }

    /// Lists all live roles, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, default_page, is_member, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM roles
            WHERE state <> 'deleted'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    /// Lists active roles only (excludes both deleted and deactivated).
    pub async fn list_active(&self) -> DbResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, default_page, is_member, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM roles
            WHERE state = 'active'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    /// Gets a live role by id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no row, or the row is soft-deleted
    pub async fn get_by_id(&self, id: &str) -> DbResult<Role> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, default_page, is_member, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM roles
            WHERE id = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        role.ok_or_else(|| DbError::not_found("Role", id))
    }

    /// Gets a role by id including soft-deleted rows.
    ///
    /// Deleted rows come back with their delete metadata populated.
    pub async fn get_by_id_any(&self, id: &str) -> DbResult<Role> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, default_page, is_member, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM roles
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        role.ok_or_else(|| DbError::not_found("Role", id))
    }

    /// Gets a live role by name, if one exists.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, default_page, is_member, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM roles
            WHERE name = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    /// Creates a new role.
    ///
    /// ## Returns
    /// * `Err(DbError::Conflict)` - a live role already holds this name
    pub async fn create(&self, new: &NewRole, actor: &str) -> DbResult<Role> {
        validate_actor(actor)?;
        validate_name(&new.name)?;
        validate_optional_text("description", new.description.as_deref())?;
        validate_optional_text("default_page", new.default_page.as_deref())?;

        let name = new.name.trim().to_string();

        if self.get_by_name(&name).await?.is_some() {
            return Err(DbError::conflict("role name", &name));
        }

        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4().to_string(),
            name,
            description: new.description.clone(),
            default_page: new.default_page.clone(),
            is_member: new.is_member,
            state: Lifecycle::Active,
            added_by: actor.to_string(),
            added_on: now,
            modified_by: actor.to_string(),
            modified_on: now,
            deleted_by: None,
            deleted_on: None,
        };

        debug!(id = %role.id, name = %role.name, "Creating role");

        sqlx::query(
            r#"
            INSERT INTO roles (
                id, name, description, default_page, is_member, state,
                added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&role.id)
        .bind(&role.name)
        .bind(&role.description)
        .bind(&role.default_page)
        .bind(role.is_member)
        .bind(role.state)
        .bind(&role.added_by)
        .bind(role.added_on)
        .bind(&role.modified_by)
        .bind(role.modified_on)
        .bind(&role.deleted_by)
        .bind(role.deleted_on)
        .execute(&self.pool)
        .await?;

        Ok(role)
    }

    /// Updates a role. Only fields present in the patch change.
    ///
    /// Re-saving a role under its own name succeeds; taking a name held by a
    /// *different* live role fails with [`DbError::Conflict`].
    pub async fn update(&self, id: &str, patch: &RoleUpdate, actor: &str) -> DbResult<Role> {
        validate_actor(actor)?;

        let mut role = self.get_by_id(id).await?;

        if let Some(name) = &patch.name {
            validate_name(name)?;
            let name = name.trim().to_string();
            if let Some(holder) = self.get_by_name(&name).await? {
                if holder.id != role.id {
                    return Err(DbError::conflict("role name", &name));
                }
            }
            role.name = name;
        }
        if let Some(description) = &patch.description {
            validate_optional_text("description", Some(description))?;
            role.description = Some(description.clone());
        }
        if let Some(default_page) = &patch.default_page {
            validate_optional_text("default_page", Some(default_page))?;
            role.default_page = Some(default_page.clone());
        }
        if let Some(is_member) = patch.is_member {
            role.is_member = is_member;
        }

        role.modified_by = actor.to_string();
        role.modified_on = Utc::now();

        debug!(id = %role.id, "Updating role");

        let result = sqlx::query(
            r#"
            UPDATE roles SET
                name = ?2,
                description = ?3,
                default_page = ?4,
                is_member = ?5,
                modified_by = ?6,
                modified_on = ?7
            WHERE id = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(&role.id)
        .bind(&role.name)
        .bind(&role.description)
        .bind(&role.default_page)
        .bind(role.is_member)
        .bind(&role.modified_by)
        .bind(role.modified_on)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Role", id));
        }

        Ok(role)
    }

    /// Soft-deletes a role.
    ///
    /// The row keeps all its data; only the state flips, plus the delete
    /// audit stamps. The name becomes reusable by new roles.
    pub async fn soft_delete(&self, id: &str, actor: &str) -> DbResult<Role> {
        validate_actor(actor)?;

        let mut role = self.get_by_id(id).await?;
        let now = Utc::now();

        debug!(id = %id, "Soft-deleting role");

        let result = sqlx::query(
            r#"
            UPDATE roles SET
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
            return Err(DbError::not_found("Role", id));
        }

        role.state = Lifecycle::Deleted;
        role.deleted_by = Some(actor.to_string());
        role.deleted_on = Some(now);
        role.modified_by = actor.to_string();
        role.modified_on = now;

        Ok(role)
    }

    /// Restores a role to the active state.
    ///
    /// Only the state flips; every other field (including the historical
    /// delete stamps) is left as-is. Restoring a name that a live role took
    /// in the meantime fails with [`DbError::Conflict`] via the unique index.
    pub async fn activate(&self, id: &str, actor: &str) -> DbResult<Role> {
        validate_actor(actor)?;

        let mut role = self.get_by_id_any(id).await?;
        let now = Utc::now();

        debug!(id = %id, "Activating role");

        sqlx::query(
            r#"
            UPDATE roles SET
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

        role.state = Lifecycle::Active;
        role.modified_by = actor.to_string();
        role.modified_on = now;

        Ok(role)
    }

    /// Switches a live role off without deleting it.
    ///
    /// The role keeps its name reserved and stays visible in `list()`, but
    /// drops out of `list_active()`.
    pub async fn deactivate(&self, id: &str, actor: &str) -> DbResult<Role> {
        validate_actor(actor)?;

        let mut role = self.get_by_id(id).await?;
        let now = Utc::now();

        debug!(id = %id, "Deactivating role");

        let result = sqlx::query(
            r#"
            UPDATE roles SET
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
            return Err(DbError::not_found("Role", id));
        }

        role.state = Lifecycle::Inactive;
        role.modified_by = actor.to_string();
        role.modified_on = now;

        Ok(role)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
