//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur while authenticating a caller.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token and no session.
    #[error("authentication required")]
    MissingToken,

    /// Token is malformed, expired, or carries a bad signature.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Token is valid but its user has since been deleted.
    #[error("user no longer exists")]
    UserGone,

    /// Wrong password or unknown email. Deliberately undifferentiated.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token signing error.
    #[error("token signing error")]
    TokenSigning,

    /// Session store error.
    #[error("session error: {0}")]
    Session(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Whether this is the caller's fault (401) rather than ours (500).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingToken | Self::InvalidToken | Self::UserGone | Self::InvalidCredentials
        )
    }
}
