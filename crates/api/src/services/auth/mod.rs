//! Authentication service.
//!
//! Provides Argon2 password hashing and HS256 bearer tokens. Both the token
//! gate and the session gate end up resolving a
//! [`CurrentUser`](crate::models::CurrentUser); this module only knows how to
//! check credentials.

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, IssuedToken, TokenService};

use std::sync::LazyLock;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a password with Argon2id and a fresh random salt.
///
/// Runs on the blocking pool so slow hashing never stalls other requests.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails or the task panics.
pub async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unreadable hash.
pub async fn verify_password(password: String, hash: String) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &hash))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

/// Hash of a throwaway password, checked when no account matches so that an
/// unknown email costs the same Argon2 work as a wrong password.
static UNKNOWN_USER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password_blocking("harbormaster-no-such-account").ok());

#[cfg(test)]
pub(crate) static UNKNOWN_USER_VERIFICATIONS: AtomicUsize = AtomicUsize::new(0);

/// Spend one password verification on a login that has no matching account,
/// then reject it.
pub async fn reject_unknown_user(password: String) -> AuthError {
    let _ = tokio::task::spawn_blocking(move || {
        #[cfg(test)]
        UNKNOWN_USER_VERIFICATIONS.fetch_add(1, Ordering::Relaxed);

        UNKNOWN_USER_HASH
            .as_deref()
            .map(|hash| verify_password_blocking(&password, hash))
    })
    .await;
    AuthError::InvalidCredentials
}

fn hash_password_blocking(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password_blocking(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("123456".to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("123456".to_string(), hash.clone()).await.is_ok());
        assert!(matches!(
            verify_password("654321".to_string(), hash).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_salts_differ() {
        let a = hash_password("123456".to_string()).await.unwrap();
        let b = hash_password("123456".to_string()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_unknown_user_is_verified_then_rejected() {
        let before = UNKNOWN_USER_VERIFICATIONS.load(Ordering::Relaxed);
        let err = reject_unknown_user("harbormaster-no-such-account".to_string()).await;
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(UNKNOWN_USER_VERIFICATIONS.load(Ordering::Relaxed) > before);
        assert!(UNKNOWN_USER_HASH.as_deref().is_some_and(|h| h.starts_with("$argon2id$")));
    }

    #[tokio::test]
    async fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("123456".to_string(), "not-a-hash".to_string()).await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
