//! User bootstrap.
//!
//! Registration over HTTP is open, but a fresh deployment needs a first
//! account before anything else can be managed from a script.

use harbormaster_api::db::PgStore;
use harbormaster_api::services::UserService;
use harbormaster_api::validation::RegistrationDraft;

use super::{CommandError, connect};

/// Create a user with the same rules as `POST /api/users`.
///
/// # Errors
///
/// Returns an error if the database is unreachable, a field is invalid or
/// the email is already registered.
pub async fn create(username: String, email: String, password: String) -> Result<(), CommandError> {
    let store = PgStore::new(connect().await?);

    let user = UserService::new(&store)
        .register(&RegistrationDraft {
            username: Some(username),
            email: Some(email),
            password: Some(password),
        })
        .await
        .map_err(|source| CommandError::Rejected {
            context: "user".to_string(),
            source,
        })?;

    tracing::info!("User created! ID: {}, Email: {}", user.id, user.email);
    Ok(())
}
