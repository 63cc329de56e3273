//! Browser pages, served in session mode only.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{OptionalPageUser, RequirePageUser};
use crate::models::Reservation;
use crate::state::AppState;

/// Dates on the dashboard, minute precision.
const DASHBOARD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate;

/// One dashboard table row.
pub struct ReservationRow {
    pub catway_number: i32,
    pub client_name: String,
    pub boat_name: String,
    pub start_date: String,
    pub end_date: String,
}

impl From<Reservation> for ReservationRow {
    fn from(r: Reservation) -> Self {
        Self {
            catway_number: r.catway_number.as_i32(),
            client_name: r.client_name,
            boat_name: r.boat_name,
            start_date: r.start_date.format(DASHBOARD_DATE_FORMAT).to_string(),
            end_date: r.end_date.format(DASHBOARD_DATE_FORMAT).to_string(),
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub username: String,
    pub today: String,
    pub reservations: Vec<ReservationRow>,
}

/// Login form, or straight to the dashboard when already signed in.
pub async fn login_page(OptionalPageUser(user): OptionalPageUser) -> Response {
    match user {
        Some(_) => Redirect::to("/dashboard").into_response(),
        None => LoginTemplate.into_response(),
    }
}

/// Reservations active right now.
///
/// # Errors
///
/// Returns an error if the store cannot be queried.
#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    RequirePageUser(user): RequirePageUser,
) -> Result<DashboardTemplate> {
    let now = Utc::now();
    let reservations = state.reservations().list_active(now).await?;

    Ok(DashboardTemplate {
        username: user.username,
        today: now.format("%A %-d %B %Y").to_string(),
        reservations: reservations.into_iter().map(ReservationRow::from).collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use harbormaster_core::{CatwayNumber, ReservationId};

    use super::*;

    #[test]
    fn test_dashboard_renders_rows() {
        let reservation = Reservation {
            id: "1".parse::<ReservationId>().unwrap(),
            catway_number: CatwayNumber::new(4).unwrap(),
            client_name: "Jo <Skipper>".to_string(),
            boat_name: "Wave".to_string(),
            start_date: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 3, 18, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        };
        let html = DashboardTemplate {
            username: "abc".to_string(),
            today: "Saturday 1 June 2024".to_string(),
            reservations: vec![ReservationRow::from(reservation)],
        }
        .render()
        .unwrap();

        assert!(html.contains("2024-06-01 09:30"));
        assert!(html.contains("Jo &#60;Skipper&#62;") || html.contains("Jo &lt;Skipper&gt;"));
        assert!(html.contains("1 active reservation(s)"));
    }

    #[test]
    fn test_empty_dashboard() {
        let html = DashboardTemplate {
            username: "abc".to_string(),
            today: "today".to_string(),
            reservations: Vec::new(),
        }
        .render()
        .unwrap();
        assert!(html.contains("No berth is currently reserved."));
    }
}
