//! User repository.
//!
//! The password hash never leaves this module except through
//! [`UserRepository::find_credentials`], which login uses to verify a
//! password.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use harbormaster_core::{Email, UserId};

use super::{PgStore, RepositoryError};
use crate::models::{NewUser, User, UserChanges};

/// Storage operations on user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// All users, by id.
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// A user together with their password hash, for login.
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Apply allow-listed changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this email.
    async fn update_user(
        &self,
        email: &Email,
        changes: &UserChanges,
    ) -> Result<User, RepositoryError>;

    /// Delete by email. Returns `false` when nothing matched.
    async fn delete_user(&self, email: &Email) -> Result<bool, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            email,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, created_at";

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (username, email, password_hash) \
             VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "email already exists", "user"))?;

        row.try_into()
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"
        ))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool())
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(self.pool())
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some((row.user.try_into()?, row.password_hash)))
    }

    async fn update_user(
        &self,
        email: &Email,
        changes: &UserChanges,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET \
                 username = COALESCE($2, username), \
                 password_hash = COALESCE($3, password_hash) \
             WHERE email = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(changes.username.as_deref())
        .bind(changes.password_hash.as_deref())
        .fetch_optional(self.pool())
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete_user(&self, email: &Email) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
