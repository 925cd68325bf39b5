//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures, classified for the caller.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("You do not have permission to modify this {0}")]
    Forbidden(&'static str),

    #[error("Store error: {0}")]
    Store(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

// Services handle `RepoError::NotFound` where it carries meaning; anything
// reaching this conversion is a backend failure.
impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        DomainError::Store(err.to_string())
    }
}
