//! Database error types.

use crm_core::{CoreError, StoreError};
use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Write rejected by a domain rule (e.g. two primary reps)
    #[error("rejected: {0}")]
    Rejected(#[from] CoreError),
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            DatabaseError::AlreadyExists { entity, id } => StoreError::Conflict {
                entity,
                message: format!("{} already exists", id),
            },
            DatabaseError::Rejected(e) => StoreError::Conflict {
                entity: "record",
                message: e.to_string(),
            },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
