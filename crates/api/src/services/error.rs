//! Domain error type shared by every service.

use thiserror::Error;

use super::AuthError;
use crate::db::RepositoryError;
use crate::validation::Violations;

/// Errors returned by the domain services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed one or more rules.
    #[error("{0}")]
    Validation(#[from] Violations),

    /// A uniqueness or dependency rule would be broken.
    #[error("{0}")]
    Conflict(String),

    /// No record matched the key. Holds the entity name.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Credentials were missing or wrong.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Storage failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
