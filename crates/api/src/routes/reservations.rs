//! Reservations, always addressed through their berth.

use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Deserialize;

use harbormaster_core::{CatwayNumber, ReservationId};

use super::ApiJson;
use super::catways::catway_key;
use crate::envelope::Envelope;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Reservation, ReservationFilter};
use crate::state::AppState;
use crate::validation::ReservationDraft;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    active: Option<String>,
}

impl ListQuery {
    fn active_only(&self) -> bool {
        self.active
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
    }
}

fn reservation_key(raw_catway: &str, raw_id: &str) -> Result<(CatwayNumber, ReservationId)> {
    let catway = catway_key(raw_catway)?;
    let id = raw_id
        .parse()
        .map_err(|_| AppError::NotFound("reservation not found".to_string()))?;
    Ok((catway, id))
}

/// All reservations, or only those active right now with `?active=true`.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Envelope<Vec<Reservation>>> {
    let reservations = if query.active_only() {
        state.reservations().list_active(Utc::now()).await?
    } else {
        state
            .reservations()
            .list(ReservationFilter::default())
            .await?
    };
    Ok(Envelope::list(reservations))
}

pub async fn scoped_index(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Envelope<Vec<Reservation>>> {
    let number = catway_key(&number)?;
    let reservations = state
        .reservations()
        .list(ReservationFilter::for_catway(number))
        .await?;
    Ok(Envelope::list(reservations))
}

pub async fn create(
    State(state): State<AppState>,
    RequireUser(ctx): RequireUser,
    Path(number): Path<String>,
    ApiJson(draft): ApiJson<ReservationDraft>,
) -> Result<Envelope<Reservation>> {
    let number = catway_key(&number)?;
    let reservation = state.reservations().create(number, &draft).await?;
    tracing::debug!(by = %ctx.user.id, reservation_id = %reservation.id, "booked");
    Ok(Envelope::data(reservation)
        .with_message("Reservation created")
        .created())
}

pub async fn show(
    State(state): State<AppState>,
    Path((number, id)): Path<(String, String)>,
) -> Result<Envelope<Reservation>> {
    let (number, id) = reservation_key(&number, &id)?;
    Ok(Envelope::data(state.reservations().get(number, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    RequireUser(_ctx): RequireUser,
    Path((number, id)): Path<(String, String)>,
    ApiJson(draft): ApiJson<ReservationDraft>,
) -> Result<Envelope<Reservation>> {
    let (number, id) = reservation_key(&number, &id)?;
    let reservation = state.reservations().update(number, id, &draft).await?;
    Ok(Envelope::data(reservation).with_message("Reservation updated"))
}

pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(_ctx): RequireUser,
    Path((number, id)): Path<(String, String)>,
) -> Result<Envelope<()>> {
    let (number, id) = reservation_key(&number, &id)?;
    state.reservations().delete(number, id).await?;
    Ok(Envelope::message("Reservation deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_flag() {
        let query = |v: Option<&str>| ListQuery {
            active: v.map(String::from),
        };
        assert!(query(Some("true")).active_only());
        assert!(query(Some("1")).active_only());
        assert!(!query(Some("false")).active_only());
        assert!(!query(None).active_only());
    }

    #[test]
    fn test_reservation_key() {
        assert!(reservation_key("3", "7").is_ok());
        assert!(matches!(
            reservation_key("3", "seven"),
            Err(AppError::NotFound(msg)) if msg == "reservation not found"
        ));
        assert!(matches!(
            reservation_key("x", "7"),
            Err(AppError::NotFound(msg)) if msg == "catway not found"
        ));
    }
}
