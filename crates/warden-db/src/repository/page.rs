//! # Page Repository
//!
//! Database operations for pages.
//!
//! ## Hierarchy
//! Pages form a tree via `parent_page_id`. The tree is validated on write:
//! a parent must exist as a live page, and a parent change that would make a
//! page its own ancestor is rejected with [`DbError::InvalidState`]. Reads
//! never walk the tree; a dangling parent (deleted later) is the caller's
//! rendering concern, not an error here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use warden_core::validation::{validate_actor, validate_name, validate_optional_text, validate_text};
use warden_core::{Lifecycle, NewPage, Page, PageUpdate, MAX_PAGE_DEPTH};

/// Repository for page database operations.
#[derive(Debug, Clone)]
pub struct PageRepository {
    pool: SqlitePool,
}

impl PageRepository {
    /// Creates a new PageRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PageRepository { pool }
    }

    /// Lists all live pages, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Page>> {
        let pages = sqlx::query_as::<_, Page>(
            r#"
            SELECT id, name, display_text, navigation_url, parent_page_id, is_internal, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM pages
            WHERE state <> 'deleted'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(pages)
    }

    /// Lists live direct children of a page, ordered by name.
    pub async fn list_children(&self, parent_page_id: &str) -> DbResult<Vec<Page>> {
        let pages = sqlx::query_as::<_, Page>(
            r#"
            SELECT id, name, display_text, navigation_url, parent_page_id, is_internal, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM pages
            WHERE parent_page_id = ?1 AND state <> 'deleted'
            ORDER BY name
            "#,
        )
        .bind(parent_page_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(pages)
    }

    /// Gets a live page by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Page> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            SELECT id, name, display_text, navigation_url, parent_page_id, is_internal, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM pages
            WHERE id = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        page.ok_or_else(|| DbError::not_found("Page", id))
    }

    /// Gets a page by id including soft-deleted rows.
    pub async fn get_by_id_any(&self, id: &str) -> DbResult<Page> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            SELECT id, name, display_text, navigation_url, parent_page_id, is_internal, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM pages
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        page.ok_or_else(|| DbError::not_found("Page", id))
    }

    /// Gets a live page by name, if one exists.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Page>> {
        let page = sqlx::query_as::<_, Page>(
            r#"
            SELECT id, name, display_text, navigation_url, parent_page_id, is_internal, state,
                   added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            FROM pages
            WHERE name = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(page)
    }

    /// Creates a new page.
    ///
    /// ## Returns
    /// * `Err(DbError::Conflict)` - a live page already holds this name
    /// * `Err(DbError::NotFound)` - the given parent is absent or deleted
    pub async fn create(&self, new: &NewPage, actor: &str) -> DbResult<Page> {
        validate_actor(actor)?;
        validate_name(&new.name)?;
        validate_text("display_text", &new.display_text)?;
        validate_optional_text("navigation_url", new.navigation_url.as_deref())?;

        let name = new.name.trim().to_string();

        if self.get_by_name(&name).await?.is_some() {
            return Err(DbError::conflict("page name", &name));
        }

        // A parent must be a live page. A freshly generated id cannot appear
        // in any existing chain, so no cycle walk is needed on create.
        if let Some(parent_id) = &new.parent_page_id {
            self.get_by_id(parent_id).await?;
        }

        let now = Utc::now();
        let page = Page {
            id: Uuid::new_v4().to_string(),
            name,
            display_text: new.display_text.clone(),
            navigation_url: new.navigation_url.clone(),
            parent_page_id: new.parent_page_id.clone(),
            is_internal: new.is_internal,
            state: Lifecycle::Active,
            added_by: actor.to_string(),
            added_on: now,
            modified_by: actor.to_string(),
            modified_on: now,
            deleted_by: None,
            deleted_on: None,
        };

        debug!(id = %page.id, name = %page.name, "Creating page");

        sqlx::query(
            r#"
            INSERT INTO pages (
                id, name, display_text, navigation_url, parent_page_id, is_internal, state,
                added_by, added_on, modified_by, modified_on, deleted_by, deleted_on
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&page.id)
        .bind(&page.name)
        .bind(&page.display_text)
        .bind(&page.navigation_url)
        .bind(&page.parent_page_id)
        .bind(page.is_internal)
        .bind(page.state)
        .bind(&page.added_by)
        .bind(page.added_on)
        .bind(&page.modified_by)
        .bind(page.modified_on)
        .bind(&page.deleted_by)
        .bind(page.deleted_on)
        .execute(&self.pool)
        .await?;

        Ok(page)
    }

    /// Updates a page. Only fields present in the patch change.
    pub async fn update(&self, id: &str, patch: &PageUpdate, actor: &str) -> DbResult<Page> {
        validate_actor(actor)?;

        let mut page = self.get_by_id(id).await?;

        if let Some(name) = &patch.name {
            validate_name(name)?;
            let name = name.trim().to_string();
            if let Some(holder) = self.get_by_name(&name).await? {
                if holder.id != page.id {
                    return Err(DbError::conflict("page name", &name));
                }
            }
            page.name = name;
        }
        if let Some(display_text) = &patch.display_text {
            validate_text("display_text", display_text)?;
            page.display_text = display_text.clone();
        }
        if let Some(navigation_url) = &patch.navigation_url {
            validate_optional_text("navigation_url", Some(navigation_url))?;
            page.navigation_url = Some(navigation_url.clone());
        }
        if let Some(parent_id) = &patch.parent_page_id {
            self.get_by_id(parent_id).await?;
            self.assert_no_cycle(&page.id, parent_id).await?;
            page.parent_page_id = Some(parent_id.clone());
        }
        if let Some(is_internal) = patch.is_internal {
            page.is_internal = is_internal;
        }

        page.modified_by = actor.to_string();
        page.modified_on = Utc::now();

        debug!(id = %page.id, "Updating page");

        let result = sqlx::query(
            r#"
            UPDATE pages SET
                name = ?2,
                display_text = ?3,
                navigation_url = ?4,
                parent_page_id = ?5,
                is_internal = ?6,
                modified_by = ?7,
                modified_on = ?8
            WHERE id = ?1 AND state <> 'deleted'
            "#,
        )
        .bind(&page.id)
        .bind(&page.name)
        .bind(&page.display_text)
        .bind(&page.navigation_url)
        .bind(&page.parent_page_id)
        .bind(page.is_internal)
        .bind(&page.modified_by)
        .bind(page.modified_on)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Page", id));
        }

        Ok(page)
    }

    /// Soft-deletes a page.
    ///
    /// Permissions pointing at the page are left alone; the matrix resolver
    /// stops returning them as soon as the page is gone.
    pub async fn soft_delete(&self, id: &str, actor: &str) -> DbResult<Page> {
        validate_actor(actor)?;

        let mut page = self.get_by_id(id).await?;
        let now = Utc::now();

        debug!(id = %id, "Soft-deleting page");

        let result = sqlx::query(
            r#"
            UPDATE pages SET
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
            return Err(DbError::not_found("Page", id));
        }

        page.state = Lifecycle::Deleted;
        page.deleted_by = Some(actor.to_string());
        page.deleted_on = Some(now);
        page.modified_by = actor.to_string();
        page.modified_on = now;

        Ok(page)
    }

    /// Restores a page to the active state, flipping only the state.
    pub async fn activate(&self, id: &str, actor: &str) -> DbResult<Page> {
        validate_actor(actor)?;

        let mut page = self.get_by_id_any(id).await?;
        let now = Utc::now();

        debug!(id = %id, "Activating page");

        sqlx::query(
            r#"
            UPDATE pages SET
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

        page.state = Lifecycle::Active;
        page.modified_by = actor.to_string();
        page.modified_on = now;

        Ok(page)
    }

    /// Walks the ancestor chain from `new_parent_id` upward and rejects the
    /// re-parenting if `page_id` appears in it.
    ///
    /// The walk is bounded by [`MAX_PAGE_DEPTH`]; a chain longer than that is
    /// treated as structurally broken.
    async fn assert_no_cycle(&self, page_id: &str, new_parent_id: &str) -> DbResult<()> {
        let mut current = new_parent_id.to_string();

        for _ in 0..MAX_PAGE_DEPTH {
            if current == page_id {
                return Err(DbError::invalid_state(
                    "Page",
                    "parent chain would form a cycle",
                ));
            }

            let parent: Option<Option<String>> =
                sqlx::query_scalar("SELECT parent_page_id FROM pages WHERE id = ?1")
                    .bind(&current)
                    .fetch_optional(&self.pool)
                    .await?;

            match parent.flatten() {
                Some(next) => current = next,
                None => return Ok(()),
            }
        }

        Err(DbError::invalid_state(
            "Page",
            "parent chain exceeds maximum depth",
        ))
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

    fn page(name: &str, parent: Option<&str>) -> NewPage {
        NewPage {
            name: name.to_string(),
            display_text: name.to_string(),
            navigation_url: Some(format!("/{}", name.to_lowercase())),
            parent_page_id: parent.map(str::to_string),
            is_internal: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let repo = db.pages();

        let dashboard = repo.create(&page("Dashboard", None), "u-1").await.unwrap();
        let fetched = repo.get_by_id(&dashboard.id).await.unwrap();
        assert_eq!(fetched.display_text, "Dashboard");
        assert_eq!(fetched.navigation_url.as_deref(), Some("/dashboard"));
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let db = test_db().await;
        let repo = db.pages();

        repo.create(&page("Dashboard", None), "u-1").await.unwrap();
        let err = repo
            .create(&page("Dashboard", None), "u-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_parent_must_be_live() {
        let db = test_db().await;
        let repo = db.pages();

        let err = repo
            .create(&page("Reports", Some("no-such-page")), "u-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let parent = repo.create(&page("Admin", None), "u-1").await.unwrap();
        repo.soft_delete(&parent.id, "u-1").await.unwrap();

        let err = repo
            .create(&page("Reports", Some(&parent.id)), "u-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_reparent_rejects_cycles() {
        let db = test_db().await;
        let repo = db.pages();

        let a = repo.create(&page("A", None), "u-1").await.unwrap();
        let b = repo.create(&page("B", Some(&a.id)), "u-1").await.unwrap();
        let c = repo.create(&page("C", Some(&b.id)), "u-1").await.unwrap();

        // A -> C would close the loop A -> C -> B -> A.
        let patch = PageUpdate {
            parent_page_id: Some(c.id.clone()),
            ..Default::default()
        };
        let err = repo.update(&a.id, &patch, "u-1").await.unwrap_err();
        assert!(matches!(err, DbError::InvalidState { .. }));

        // Self-parenting is the degenerate cycle.
        let patch = PageUpdate {
            parent_page_id: Some(a.id.clone()),
            ..Default::default()
        };
        let err = repo.update(&a.id, &patch, "u-1").await.unwrap_err();
        assert!(matches!(err, DbError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_reparent_to_sibling_branch_is_fine() {
        let db = test_db().await;
        let repo = db.pages();

        let root = repo.create(&page("Root", None), "u-1").await.unwrap();
        let left = repo
            .create(&page("Left", Some(&root.id)), "u-1")
            .await
            .unwrap();
        let right = repo
            .create(&page("Right", Some(&root.id)), "u-1")
            .await
            .unwrap();

        let patch = PageUpdate {
            parent_page_id: Some(left.id.clone()),
            ..Default::default()
        };
        let moved = repo.update(&right.id, &patch, "u-1").await.unwrap();
        assert_eq!(moved.parent_page_id.as_deref(), Some(left.id.as_str()));

        let children = repo.list_children(&left.id).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "Right");
    }

    #[tokio::test]
    async fn test_soft_delete_and_restore() {
        let db = test_db().await;
        let repo = db.pages();

        let p = repo.create(&page("Dashboard", None), "u-1").await.unwrap();
        repo.soft_delete(&p.id, "u-1").await.unwrap();
        assert!(matches!(
            repo.get_by_id(&p.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));

        let restored = repo.activate(&p.id, "u-2").await.unwrap();
        assert_eq!(restored.state, Lifecycle::Active);
        assert!(repo.get_by_id(&p.id).await.is_ok());
    }
}
