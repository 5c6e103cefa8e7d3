//! # Permission Repository
//!
//! Database operations for permissions and the permission matrix resolver.
//!
//! ## Natural Key
//! (role_id, page_id) identifies a live permission. The pair is checked
//! before every create and before any update that re-points either side,
//! with the partial unique index `idx_permissions_live_pair` as the backstop.
//!
//! ## Matrix Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │             resolve_for_role(role_id)                               │
//! │                                                                     │
//! │   permissions (live, role_id = R) ──INNER JOIN── pages (live)      │
//! │                                                                     │
//! │   A permission whose page was soft-deleted simply drops out of     │
//! │   the result - a dangling permission is invisible, not an error.   │
//! │   Rows are ordered by page id so output is deterministic.          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use warden_core::validation::validate_actor;
use warden_core::{
    Lifecycle, NewPermission, PagePermission, Permission, PermissionDetail, PermissionUpdate,
};

/// Repository for permission database operations.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: SqlitePool,
}

impl PermissionRepository {
    /// Creates a new PermissionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PermissionRepository { pool }
    }

    /// Gets a live permission by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Permission> {
        let permission = sqlx::query_as::<_, Permission>(
            r#"
            SELECT id, role_id, page_id, can_view, can_create, can_update, can_delete, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM permissions
            WHERE id = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        permission.ok_or_else(|| DbError::not_found("Permission", id))
    }

    /// Gets a permission by id including soft-deleted rows.
    pub async fn get_by_id_any(&self, id: &str) -> DbResult<Permission> {
        let permission = sqlx::query_as::<_, Permission>(
            r#"
            SELECT id, role_id, page_id, can_view, can_create, can_update, can_delete, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM permissions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        permission.ok_or_else(|| DbError::not_found("Permission", id))
    }

    /// Gets the live permission for a (role, page) pair, if one exists.
    pub async fn get_by_role_and_page(
        &self,
        role_id: &str,
        page_id: &str,
    ) -> DbResult<Option<Permission>> {
        let permission = sqlx::query_as::<_, Permission>(
            r#"
            SELECT id, role_id, page_id, can_view, can_create, can_update, can_delete, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM permissions
            WHERE role_id = ?1 AND page_id = ?2 AND state <> 'deleted'
            "#,
        )
        .bind(role_id)
        .bind(page_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(permission)
    }

    /// Creates a new permission.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - role or page absent/deleted
    /// * `Err(DbError::Conflict)` - a live permission already covers the pair
    pub async fn create(&self, new: &NewPermission, actor: &str) -> DbResult<Permission> {
        validate_actor(actor)?;

        self.assert_role_live(&new.role_id).await?;
        self.assert_page_live(&new.page_id).await?;

        if self
            .get_by_role_and_page(&new.role_id, &new.page_id)
            .await?
            .is_some()
        {
            return Err(DbError::conflict(
                "permission (role, page)",
                format!("{}/{}", new.role_id, new.page_id),
            ));
        }

        let now = Utc::now();
        let permission = Permission {
            id: Uuid::new_v4().to_string(),
            role_id: new.role_id.clone(),
            page_id: new.page_id.clone(),
            can_view: new.can_view,
            can_create: new.can_create,
            can_update: new.can_update,
            can_delete: new.can_delete,
            state: Lifecycle::Active,
            added_by: actor.to_string(),
            added_on: now,
            modified_by: actor.to_string(),
            modified_on: now,
            deleted_by: None,
            deleted_on: None,
        };

        debug!(
            id = %permission.id,
            role_id = %permission.role_id,
            page_id = %permission.page_id,
            "Creating permission"
        );

        sqlx::query(
            r#"
            INSERT INTO permissions (
                id, role_id, page_id, can_view, can_create, can_update, can_delete, state,
                added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&permission.id)
        .bind(&permission.role_id)
        .bind(&permission.page_id)
        .bind(permission.can_view)
        .bind(permission.can_create)
        .bind(permission.can_update)
        .bind(permission.can_delete)
        .bind(permission.state)
        .bind(&permission.added_by)
        .bind(permission.added_on)
        .bind(&permission.modified_by)
        .bind(permission.modified_on)
        .bind(&permission.deleted_by)
        .bind(permission.deleted_on)
        .execute(&self.pool)
        .await?;

        Ok(permission)
    }

    /// Updates a permission. Only fields present in the patch change.
    ///
    /// Re-pointing `role_id`/`page_id` re-checks the (role, page) natural
    /// key; keeping the current pair is always allowed.
    pub async fn update(
        &self,
        id: &str,
        patch: &PermissionUpdate,
        actor: &str,
    ) -> DbResult<Permission> {
        validate_actor(actor)?;

        let mut permission = self.get_by_id(id).await?;

        if let Some(role_id) = &patch.role_id {
            self.assert_role_live(role_id).await?;
            permission.role_id = role_id.clone();
        }
        if let Some(page_id) = &patch.page_id {
            self.assert_page_live(page_id).await?;
            permission.page_id = page_id.clone();
        }
        if patch.role_id.is_some() || patch.page_id.is_some() {
            if let Some(holder) = self
                .get_by_role_and_page(&permission.role_id, &permission.page_id)
                .await?
            {
                if holder.id != permission.id {
                    return Err(DbError::conflict(
                        "permission (role, page)",
                        format!("{}/{}", permission.role_id, permission.page_id),
                    ));
                }
            }
        }

        if let Some(can_view) = patch.can_view {
            permission.can_view = can_view;
        }
        if let Some(can_create) = patch.can_create {
            permission.can_create = can_create;
        }
        if let Some(can_update) = patch.can_update {
            permission.can_update = can_update;
        }
        if let Some(can_delete) = patch.can_delete {
            permission.can_delete = can_delete;
        }

        permission.modified_by = actor.to_string();
        permission.modified_on = Utc::now();

        debug!(id = %permission.id, "Updating permission");

        let result = sqlx::query(
            r#"
            UPDATE permissions SET
                role_id = ?2,
                page_id = ?3,
                can_view = ?4,
                can_create = ?5,
                can_update = ?6,
                can_delete = ?7,
                modified_by = ?8,
                modified_on = ?9
            WHERE id = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(&permission.id)
        .bind(&permission.role_id)
        .bind(&permission.page_id)
        .bind(permission.can_view)
        .bind(permission.can_create)
        .bind(permission.can_update)
        .bind(permission.can_delete)
        .bind(&permission.modified_by)
        .bind(permission.modified_on)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Permission", id));
        }

        Ok(permission)
    }

    /// Soft-deletes a permission, freeing its (role, page) pair.
    pub async fn soft_delete(&self, id: &str, actor: &str) -> DbResult<Permission> {
        validate_actor(actor)?;

        let mut permission = self.get_by_id(id).await?;
        let now = Utc::now();

        debug!(id = %id, "Soft-deleting permission");

        let result = sqlx::query(
            r#"
            UPDATE permissions SET
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
            return Err(DbError::not_found("Permission", id));
        }

        permission.state = Lifecycle::Deleted;
        permission.deleted_by = Some(actor.to_string());
        permission.deleted_on = Some(now);
        permission.modified_by = actor.to_string();
        permission.modified_on = now;

        Ok(permission)
    }

    /// Restores a permission to the active state.
    ///
    /// Fails with [`DbError::Conflict`] (via the unique index) if a live
    /// permission took the (role, page) pair in the meantime.
    pub async fn activate(&self, id: &str, actor: &str) -> DbResult<Permission> {
        validate_actor(actor)?;

        let mut permission = self.get_by_id_any(id).await?;
        let now = Utc::now();

        debug!(id = %id, "Activating permission");

        sqlx::query(
            r#"
            UPDATE permissions SET
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

        permission.state = Lifecycle::Active;
        permission.modified_by = actor.to_string();
        permission.modified_on = now;

        Ok(permission)
    }

    // =========================================================================
    // Matrix Resolution
    // =========================================================================

    /// Resolves the effective capability list for a role.
    ///
    /// Inner-joins live permissions with live pages; permissions whose page
    /// has been soft-deleted are silently excluded. Rows are ordered by page
    /// id. An empty result is not an error.
    pub async fn resolve_for_role(&self, role_id: &str) -> DbResult<Vec<PagePermission>> {
        debug!(role_id = %role_id, "Resolving permission matrix");

        let rows = sqlx::query_as::<_, PagePermission>(
            r#"
            SELECT
                p.id AS permission_id,
                p.role_id,
                pg.id AS page_id,
                pg.name AS page_name,
                pg.display_text AS page_display_text,
                pg.navigation_url AS page_navigation_url,
                pg.parent_page_id,
                pg.is_internal,
                p.can_view,
                p.can_create,
                p.can_update,
                p.can_delete
            FROM permissions p
            INNER JOIN pages pg ON pg.id = p.page_id
            WHERE p.role_id = ?1
              AND p.state <> 'deleted'
              AND pg.state <> 'deleted'
            ORDER BY pg.id
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(role_id = %role_id, count = rows.len(), "Matrix resolved");
        Ok(rows)
    }

    /// Returns every live permission without the page join, for
    /// administrative listing.
    pub async fn resolve_all(&self) -> DbResult<Vec<Permission>> {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT id, role_id, page_id, can_view, can_create, can_update, can_delete, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM permissions
            WHERE state <> 'deleted'
            ORDER BY role_id, page_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    /// Administrative listing joined with role and page metadata.
    ///
    /// Restricted to active roles and live pages, matching what an admin
    /// screen would show.
    pub async fn list_detailed(&self) -> DbResult<Vec<PermissionDetail>> {
        let rows = sqlx::query_as::<_, PermissionDetail>(
            r#"
            SELECT
                p.id AS permission_id,
                p.role_id,
                r.name AS role_name,
                pg.id AS page_id,
                pg.name AS page_name,
                pg.display_text AS page_display_text,
                pg.navigation_url AS page_navigation_url,
                pg.is_internal,
                p.can_view,
                p.can_create,
                p.can_update,
                p.can_delete
            FROM permissions p
            INNER JOIN pages pg ON pg.id = p.page_id
            INNER JOIN roles r ON r.id = p.role_id
            WHERE p.state <> 'deleted'
              AND pg.state <> 'deleted'
              AND r.state = 'active'
            ORDER BY r.name, pg.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Lists soft-deleted permissions, for audit screens.
    pub async fn list_deleted(&self) -> DbResult<Vec<Permission>> {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT id, role_id, page_id, can_view, can_create, can_update, can_delete, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM permissions
            WHERE state = 'deleted'
            ORDER BY deleted_on
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    // =========================================================================
    // Reference Checks
    // =========================================================================

    async fn assert_role_live(&self, role_id: &str) -> DbResult<()> {
        let exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM roles WHERE id = ?1 AND state <> 'deleted'")
                .bind(role_id)
                .fetch_optional(&self.pool)
                .await?;

        match exists {
            Some(_) => Ok(()),
            None => Err(DbError::not_found("Role", role_id)),
        }
    }

    async fn assert_page_live(&self, page_id: &str) -> DbResult<()> {
        let exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM pages WHERE id = ?1 AND state <> 'deleted'")
                .bind(page_id)
                .fetch_optional(&self.pool)
                .await?;

        match exists {
            Some(_) => Ok(()),
            None => Err(DbError::not_found("Page", page_id)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
