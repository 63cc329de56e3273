//! Authentication extractors.
//!
//! [`RequireUser`] is the API gate. Which credential it accepts depends on
//! [`AuthMode`]: a bearer token in token mode, the session cookie in session
//! mode, never both. Either way the handler receives the same
//! [`RequestContext`].
//!
//! [`RequirePageUser`] and [`OptionalPageUser`] serve the browser pages and
//! always read the session.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::config::AuthMode;
use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, RequestContext, session_keys};
use crate::services::AuthError;
use crate::state::AppState;

/// Extractor that requires an authenticated caller.
///
/// Rejects with a 401 envelope.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(ctx): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", ctx.user.username)
/// }
/// ```
pub struct RequireUser(pub RequestContext);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match state.config().auth_mode {
            AuthMode::Token => user_from_token(parts, state).await?,
            AuthMode::Session => session_user(parts, state)
                .await?
                .ok_or(AuthError::MissingToken)?,
        };

        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(RequestContext { user }))
    }
}

/// Resolve `Authorization: Bearer <token>` to the user it was issued for.
async fn user_from_token(parts: &Parts, state: &AppState) -> Result<CurrentUser, AuthError> {
    let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
    let user_id = state.tokens().verify(token)?;

    let user = state
        .store()
        .find_user_by_id(user_id)
        .await?
        .ok_or(AuthError::UserGone)?;

    Ok(CurrentUser::from(&user))
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The user stored in the session, if any, reloaded from the store.
///
/// A session whose user has since been deleted is flushed and rejected with
/// [`AuthError::UserGone`].
async fn session_user(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<CurrentUser>, AuthError> {
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };
    let Some(cached) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .map_err(|e| AuthError::Session(e.to_string()))?
    else {
        return Ok(None);
    };

    match state.store().find_user_by_id(cached.id).await? {
        Some(user) => Ok(Some(CurrentUser::from(&user))),
        None => {
            tracing::info!(user_id = %cached.id, "session user no longer exists");
            clear_current_user(session)
                .await
                .map_err(|e| AuthError::Session(e.to_string()))?;
            Err(AuthError::UserGone)
        }
    }
}

/// Extractor for browser pages that need a logged-in session.
///
/// Unauthenticated navigations are redirected to the login page at `/`
/// instead of receiving a JSON error.
pub struct RequirePageUser(pub CurrentUser);

/// Rejection for [`RequirePageUser`].
pub struct PageRejection;

impl IntoResponse for PageRejection {
    fn into_response(self) -> Response {
        Redirect::to("/").into_response()
    }
}

impl FromRequestParts<AppState> for RequirePageUser {
    type Rejection = PageRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await {
            Ok(Some(user)) => Ok(Self(user)),
            Ok(None) => Err(PageRejection),
            Err(e) => {
                tracing::warn!(error = %e, "session rejected, redirecting to login");
                Err(PageRejection)
            }
        }
    }
}

/// Extractor that optionally gets the session user, never rejecting.
pub struct OptionalPageUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalPageUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts, state).await.ok().flatten()))
    }
}

/// Store the logged-in user in the session, rotating its id first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Destroy the session (logout). The cookie is cleared in the response.
///
/// # Errors
///
/// Returns an error if the session store cannot delete the record.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
