//! # Database Error Types
//!
//! Error types for entity store operations.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Error Taxonomy                               │
//! │                                                                     │
//! │  Recoverable by caller (caller picks the transport response):      │
//! │  ├── NotFound      - referenced id has no live record              │
//! │  ├── Conflict      - natural-key collision on create/rename        │
//! │  ├── InvalidState  - operation not meaningful in current state     │
//! │  └── Validation    - input shape rejected before any query         │
//! │                                                                     │
//! │  Internal faults (distinct - never collapsed into the above):     │
//! │  ├── ConnectionFailed / MigrationFailed / QueryFailed              │
//! │  ├── ForeignKeyViolation                                           │
//! │  ├── PoolExhausted                                                 │
//! │  └── Internal                                                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Conflating "record absent" with "store unreachable" is a correctness
//! bug; the `From<sqlx::Error>` impl below keeps the two apart.

use thiserror::Error;
use warden_core::ValidationError;

/// Entity store operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Referenced id has no live record.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Natural-key collision: a different live record already holds this key.
    #[error("Conflict on {key}: '{value}' already exists")]
    Conflict { key: String, value: String },

    /// The operation is not meaningful for the record's current state.
    #[error("{entity} is in an invalid state for this operation: {reason}")]
    InvalidState { entity: String, reason: String },

    /// Input rejected before any query ran.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Conflict error naming the offending natural key.
    pub fn conflict(key: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::Conflict {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        DbError::InvalidState {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller can recover by changing its request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DbError::NotFound { .. }
                | DbError::Conflict { .. }
                | DbError::InvalidState { .. }
                | DbError::Validation(_)
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE: "UNIQUE constraint failed: <table>.<column>, ..."
                // FK:     "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let key = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::Conflict {
                        key,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for entity store operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DbError::not_found("Role", "r-1");
        assert_eq!(err.to_string(), "Role not found: r-1");

        let err = DbError::conflict("role name", "Admin");
        assert_eq!(err.to_string(), "Conflict on role name: 'Admin' already exists");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(DbError::not_found("Role", "r-1").is_recoverable());
        assert!(DbError::conflict("page name", "Home").is_recoverable());
        assert!(DbError::invalid_state("Address", "inactive").is_recoverable());
        assert!(!DbError::PoolExhausted.is_recoverable());
        assert!(!DbError::Internal("boom".to_string()).is_recoverable());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
