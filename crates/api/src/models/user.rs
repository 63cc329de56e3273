//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use harbormaster_core::{Email, UserId};

/// A harbour office account (domain type).
///
/// Deliberately carries no password material: the hash only ever travels
/// through [`crate::db::UserRepository::find_credentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Normalized, unique email address.
    pub email: Email,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// A validated registration ready for insertion.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    pub password_hash: String,
}

/// Allow-listed profile changes. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    /// True when applying the changes would not modify anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.password_hash.is_none()
    }
}
