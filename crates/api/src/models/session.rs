//! Request identity types.

use serde::{Deserialize, Serialize};

use harbormaster_core::{Email, UserId};

/// Resolved identity of the caller.
///
/// In session mode this is exactly what the session stores; in token mode it
/// is rebuilt from the user record the token points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's display name.
    pub username: String,
}

impl From<&crate::models::User> for CurrentUser {
    fn from(user: &crate::models::User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
        }
    }
}

/// Per-request context handed to handlers by the authentication gate.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: CurrentUser,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
