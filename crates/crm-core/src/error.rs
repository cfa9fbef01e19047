//! Error types for the CRM core.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised by the list-view and workflow logic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A filter key that no list view understands.
    #[error("unknown filter key: {0}")]
    UnknownFilterKey(String),

    /// A sort field that the entity does not expose.
    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    /// A sort direction other than `asc`/`desc`.
    #[error("unknown sort direction: {0}")]
    UnknownSortDirection(String),

    /// Rep assignment violated the primary-rep rule.
    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),

    /// Form input rejected before reaching the backend.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors reported by a backend store.
///
/// The repository adapter turns every one of these into a failed envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record conflicts with existing data
    #[error("{entity} conflict: {message}")]
    Conflict { entity: &'static str, message: String },

    /// Anything else the backend reported (connection, query, ...)
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
