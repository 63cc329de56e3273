//! Login and logout.

use axum::{
    extract::State,
    http::{HeaderMap, header::ACCEPT},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::ApiJson;
use crate::config::AuthMode;
use crate::envelope::Envelope;
use crate::error::{Result, clear_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::Credential;
use crate::state::AppState;
use crate::validation::LoginDraft;

/// Check credentials and hand out a bearer token.
///
/// In session mode the user is also stored in the session, which sets the
/// session cookie.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(draft): ApiJson<LoginDraft>,
) -> Result<Envelope<Credential>> {
    let credential = state.users().authenticate(state.tokens(), &draft).await?;

    if state.config().auth_mode == AuthMode::Session {
        set_current_user(&session, &CurrentUser::from(&credential.user)).await?;
    }

    Ok(Envelope::data(credential).with_message("Login successful"))
}

/// Destroy the session.
///
/// JSON clients get an envelope; browsers are sent back to the login page.
pub async fn logout(session: Session, headers: HeaderMap) -> Result<Response> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    if accepts_json(&headers) {
        Ok(Envelope::message("Logged out").into_response())
    } else {
        Ok(Redirect::to("/").into_response())
    }
}

fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}
