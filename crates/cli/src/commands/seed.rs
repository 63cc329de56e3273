//! Load berth and reservation fixtures.
//!
//! Every record is validated with the API's rules before the existing berths
//! and reservations are removed, so a bad fixture leaves the database as it
//! was. Records are then inserted through the same services as the API.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use harbormaster_api::db::PgStore;
use harbormaster_api::services::{CatwayService, ReservationService, ServiceError};
use harbormaster_api::validation::{
    CatwayDraft, ReservationDraft, Violations, validate_catway, validate_reservation,
};
use harbormaster_core::CatwayNumber;

use super::{CommandError, connect};

/// A reservation fixture: the berth travels with the record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationFixture {
    pub catway_number: i64,
    #[serde(flatten)]
    pub draft: ReservationDraft,
}

/// Replace all berths and reservations.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, or a record is
/// rejected. Validation failures leave the database untouched.
pub async fn run(catways_path: &Path, reservations_path: &Path) -> Result<(), CommandError> {
    let catways: Vec<CatwayDraft> = read_json(catways_path).await?;
    let reservations: Vec<ReservationFixture> = read_json(reservations_path).await?;
    validate_fixtures(&catways, &reservations)?;
    tracing::info!(
        catways = catways.len(),
        reservations = reservations.len(),
        "Validated fixtures"
    );

    let pool = connect().await?;
    sqlx::query("TRUNCATE reservations, catways RESTART IDENTITY")
        .execute(&pool)
        .await?;
    tracing::info!("Cleared berths and reservations");

    let store = PgStore::new(pool);

    let catway_service = CatwayService::new(&store);
    for (index, draft) in catways.iter().enumerate() {
        catway_service
            .create(draft)
            .await
            .map_err(|source| CommandError::Rejected {
                context: format!("catway #{index}"),
                source,
            })?;
    }

    let reservation_service = ReservationService::new(&store);
    for (index, fixture) in reservations.iter().enumerate() {
        let rejected = |source| CommandError::Rejected {
            context: format!("reservation #{index}"),
            source,
        };
        let number = fixture_catway(fixture).map_err(rejected)?;
        reservation_service
            .create(number, &fixture.draft)
            .await
            .map_err(rejected)?;
    }

    tracing::info!("Seed complete!");
    Ok(())
}

/// Check every fixture against the API's rules without touching the database.
///
/// Berth numbers must be unique and each reservation must point at a berth
/// from the same fixture set.
///
/// # Errors
///
/// Returns `CommandError::Rejected` naming the first offending record.
pub fn validate_fixtures(
    catways: &[CatwayDraft],
    reservations: &[ReservationFixture],
) -> Result<(), CommandError> {
    let mut numbers = HashSet::with_capacity(catways.len());
    for (index, draft) in catways.iter().enumerate() {
        let rejected = |source| CommandError::Rejected {
            context: format!("catway #{index}"),
            source,
        };
        let catway = validate_catway(draft).map_err(|v| rejected(v.into()))?;
        if !numbers.insert(catway.catway_number) {
            return Err(rejected(ServiceError::Conflict(format!(
                "catway {} is listed twice",
                catway.catway_number
            ))));
        }
    }

    for (index, fixture) in reservations.iter().enumerate() {
        let rejected = |source| CommandError::Rejected {
            context: format!("reservation #{index}"),
            source,
        };
        let number = fixture_catway(fixture).map_err(rejected)?;
        if !numbers.contains(&number) {
            return Err(rejected(ServiceError::Validation(Violations::single(
                "catwayNumber",
                format!("catway {number} is not in the berth fixtures"),
            ))));
        }
        validate_reservation(number, &fixture.draft).map_err(|v| rejected(v.into()))?;
    }

    Ok(())
}

fn fixture_catway(fixture: &ReservationFixture) -> Result<CatwayNumber, ServiceError> {
    CatwayNumber::new(fixture.catway_number).map_err(|e| {
        ServiceError::Validation(Violations::single("catwayNumber", e.to_string()))
    })
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CommandError> {
    let display = path.display().to_string();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: display.clone(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| CommandError::Json {
        path: display,
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_fixture_shape() {
        let json = r#"[{
            "catwayNumber": 1,
            "clientName": "Thomas Martin",
            "boatName": "Carolina",
            "startDate": "2022-05-21T06:00:00Z",
            "endDate": "2022-10-27T06:00:00Z"
        }]"#;
        let fixtures: Vec<ReservationFixture> = serde_json::from_str(json).unwrap();
        assert_eq!(fixtures[0].catway_number, 1);
        assert_eq!(fixtures[0].draft.boat_name.as_deref(), Some("Carolina"));
    }

    fn catways() -> Vec<CatwayDraft> {
        serde_json::from_str(
            r#"[
                {"catwayNumber": 1, "catwayType": "long", "catwayState": "bon état"},
                {"catwayNumber": 2, "catwayType": "short", "catwayState": "bon état"}
            ]"#,
        )
        .unwrap()
    }

    fn reservation(catway_number: i64, start: &str, end: &str) -> ReservationFixture {
        serde_json::from_value(serde_json::json!({
            "catwayNumber": catway_number,
            "clientName": "Thomas Martin",
            "boatName": "Carolina",
            "startDate": start,
            "endDate": end,
        }))
        .unwrap()
    }

    fn rejected_context(result: Result<(), CommandError>) -> String {
        match result {
            Err(CommandError::Rejected { context, .. }) => context,
            other => panic!("expected a rejected fixture, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_fixtures_accepts_clean_set() {
        let reservations = vec![
            reservation(1, "2022-05-21T06:00:00Z", "2022-10-27T06:00:00Z"),
            reservation(2, "2022-06-01T06:00:00Z", "2022-06-15T06:00:00Z"),
        ];
        validate_fixtures(&catways(), &reservations).unwrap();
    }

    #[test]
    fn test_validate_fixtures_rejects_inverted_reservation() {
        let reservations = vec![
            reservation(1, "2022-05-21T06:00:00Z", "2022-10-27T06:00:00Z"),
            reservation(2, "2022-06-15T06:00:00Z", "2022-06-01T06:00:00Z"),
        ];
        let context = rejected_context(validate_fixtures(&catways(), &reservations));
        assert_eq!(context, "reservation #1");
    }

    #[test]
    fn test_validate_fixtures_rejects_unknown_berth() {
        let reservations = vec![reservation(9, "2022-05-21T06:00:00Z", "2022-10-27T06:00:00Z")];
        let context = rejected_context(validate_fixtures(&catways(), &reservations));
        assert_eq!(context, "reservation #0");
    }

    #[test]
    fn test_validate_fixtures_rejects_bad_catway() {
        let mut drafts = catways();
        drafts[1].catway_type = Some("medium".to_string());
        let context = rejected_context(validate_fixtures(&drafts, &[]));
        assert_eq!(context, "catway #1");

        let mut drafts = catways();
        drafts[1].catway_number = Some(1);
        let context = rejected_context(validate_fixtures(&drafts, &[]));
        assert_eq!(context, "catway #1");
    }

    #[test]
    fn test_catway_fixture_ignores_extra_fields() {
        let json =
            r#"[{"_id": "x", "catwayNumber": 3, "catwayType": "short", "catwayState": "ok"}]"#;
        let fixtures: Vec<CatwayDraft> = serde_json::from_str(json).unwrap();
        assert_eq!(fixtures[0].catway_number, Some(3));
    }
}
