//! Berth directory.

use axum::extract::{Path, State};

use harbormaster_core::CatwayNumber;

use super::ApiJson;
use crate::envelope::Envelope;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Catway;
use crate::services::ServiceError;
use crate::state::AppState;
use crate::validation::{CatwayDraft, CatwayStateDraft};

/// Parse a berth number from the path. Anything unparseable names no berth.
pub(super) fn catway_key(raw: &str) -> Result<CatwayNumber> {
    raw.parse()
        .map_err(|_| AppError::NotFound("catway not found".to_string()))
}

pub async fn index(State(state): State<AppState>) -> Result<Envelope<Vec<Catway>>> {
    Ok(Envelope::list(state.catways().list().await?))
}

/// Create a berth. A taken number is a client error, not a conflict.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(_ctx): RequireUser,
    ApiJson(draft): ApiJson<CatwayDraft>,
) -> Result<Envelope<Catway>> {
    let catway = state.catways().create(&draft).await.map_err(|e| match e {
        ServiceError::Conflict(msg) => AppError::BadRequest(msg),
        other => AppError::from(other),
    })?;
    Ok(Envelope::data(catway).with_message("Catway created").created())
}

pub async fn show(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Envelope<Catway>> {
    let number = catway_key(&number)?;
    Ok(Envelope::data(state.catways().get(number).await?))
}

/// Replace the condition report. Number and type are fixed once created.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(_ctx): RequireUser,
    Path(number): Path<String>,
    ApiJson(draft): ApiJson<CatwayStateDraft>,
) -> Result<Envelope<Catway>> {
    let number = catway_key(&number)?;
    let catway = state.catways().update_state(number, &draft).await?;
    Ok(Envelope::data(catway).with_message("Catway updated"))
}

pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(_ctx): RequireUser,
    Path(number): Path<String>,
) -> Result<Envelope<()>> {
    let number = catway_key(&number)?;
    state.catways().delete(number).await?;
    Ok(Envelope::message("Catway deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catway_key() {
        assert!(catway_key("12").is_ok());
        assert!(matches!(catway_key("abc"), Err(AppError::NotFound(_))));
        assert!(matches!(catway_key("0"), Err(AppError::NotFound(_))));
    }
}
