//! User directory and registration.

use axum::extract::{Path, State};

use super::ApiJson;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::User;
use crate::state::AppState;
use crate::validation::{RegistrationDraft, UserUpdateDraft};

pub async fn index(
    State(state): State<AppState>,
    RequireUser(_ctx): RequireUser,
) -> Result<Envelope<Vec<User>>> {
    Ok(Envelope::list(state.users().list().await?))
}

/// Register a new account. Open to anonymous callers.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<RegistrationDraft>,
) -> Result<Envelope<User>> {
    let user = state.users().register(&draft).await?;
    Ok(Envelope::data(user).with_message("User created").created())
}

pub async fn show(
    State(state): State<AppState>,
    RequireUser(_ctx): RequireUser,
    Path(key): Path<String>,
) -> Result<Envelope<User>> {
    Ok(Envelope::data(state.users().find_by_key(&key).await?))
}

pub async fn update(
    State(state): State<AppState>,
    RequireUser(ctx): RequireUser,
    Path(key): Path<String>,
    ApiJson(draft): ApiJson<UserUpdateDraft>,
) -> Result<Envelope<User>> {
    let user = state.users().update(&key, &draft).await?;
    tracing::debug!(by = %ctx.user.id, target = %user.id, "profile update");
    Ok(Envelope::data(user).with_message("User updated"))
}

pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(ctx): RequireUser,
    Path(key): Path<String>,
) -> Result<Envelope<()>> {
    state.users().delete(&key).await?;
    tracing::debug!(by = %ctx.user.id, key = %key, "user removed");
    Ok(Envelope::message("User deleted"))
}
