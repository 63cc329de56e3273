//! User accounts: registration, login, profile management.

use serde::Serialize;

use harbormaster_core::{Email, UserId};

use super::auth::{self, IssuedToken, TokenService};
use super::ServiceError;
use crate::db::{RepositoryError, Store, UserRepository};
use crate::models::{NewUser, User, UserChanges};
use crate::validation::{
    LoginDraft, RegistrationDraft, UserUpdateDraft, validate_login, validate_registration,
    validate_user_update,
};

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: User,
}

/// User service.
pub struct UserService<'a> {
    store: &'a dyn Store,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for bad fields and
    /// `ServiceError::Conflict` if the email is already registered.
    pub async fn register(&self, draft: &RegistrationDraft) -> Result<User, ServiceError> {
        let valid = validate_registration(draft)?;
        let password_hash = auth::hash_password(valid.password).await?;

        let user = self
            .store
            .insert_user(&NewUser {
                username: valid.username,
                email: valid.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    ServiceError::Conflict("email already exists".to_owned())
                }
                other => ServiceError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Check an email/password pair and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` when a field is missing and
    /// `AuthError::InvalidCredentials` for an unknown email or wrong
    /// password alike.
    pub async fn authenticate(
        &self,
        tokens: &TokenService,
        draft: &LoginDraft,
    ) -> Result<Credential, ServiceError> {
        let (email, password) = validate_login(draft)?;
        let credentials = match Email::parse(&email) {
            Ok(email) => self.store.find_credentials(&email).await?,
            Err(_) => None,
        };
        let Some((user, password_hash)) = credentials else {
            return Err(auth::reject_unknown_user(password).await.into());
        };

        auth::verify_password(password, password_hash).await?;

        let IssuedToken { token, expires_at } = tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(Credential {
            token,
            expires_at,
            user,
        })
    }

    /// Every account, by id. Never carries password material.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.list_users().await?)
    }

    /// Look up a user by id (numeric keys) or by email.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if nothing matches.
    pub async fn find_by_key(&self, key: &str) -> Result<User, ServiceError> {
        let found = if let Ok(id) = key.parse::<UserId>() {
            self.store.find_user_by_id(id).await?
        } else if let Ok(email) = Email::parse(key) {
            self.store.find_user_by_email(&email).await?
        } else {
            None
        };
        found.ok_or(ServiceError::NotFound("user"))
    }

    /// Apply an allow-listed profile update.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown key and
    /// `ServiceError::Validation` for bad fields.
    pub async fn update(&self, key: &str, draft: &UserUpdateDraft) -> Result<User, ServiceError> {
        let user = self.find_by_key(key).await?;
        let valid = validate_user_update(draft)?;

        let password_hash = match valid.password {
            Some(password) => Some(auth::hash_password(password).await?),
            None => None,
        };
        let changes = UserChanges {
            username: valid.username,
            password_hash,
        };
        if changes.is_empty() {
            return Ok(user);
        }

        let updated = self
            .store
            .update_user(&user.email, &changes)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound("user"),
                other => ServiceError::Repository(other),
            })?;

        tracing::info!(
            user_id = %updated.id,
            password_changed = changes.password_hash.is_some(),
            "user updated"
        );
        Ok(updated)
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown key.
    pub async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        let user = self.find_by_key(key).await?;
        if !self.store.delete_user(&user.email).await? {
            return Err(ServiceError::NotFound("user"));
        }
        tracing::info!(user_id = %user.id, "user deleted");
        Ok(())
    }
}
