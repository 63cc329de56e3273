//! Reservations and the active-reservation queries.
//!
//! Every single-record operation is scoped by berth number: an id that
//! exists under another berth is reported as not found. Overlapping
//! reservations on the same berth are accepted.

use chrono::{DateTime, Utc};

use harbormaster_core::{CatwayNumber, ReservationId};

use super::ServiceError;
use crate::db::{CatwayRepository, RepositoryError, ReservationRepository, Store};
use crate::models::{Reservation, ReservationFilter};
use crate::validation::{
    ReservationDraft, check_interval, validate_reservation, validate_reservation_patch,
};

/// Whether `reservation` covers `now` (closed interval).
#[must_use]
pub fn is_active(reservation: &Reservation, now: DateTime<Utc>) -> bool {
    reservation.is_active(now)
}

/// Reservation service.
pub struct ReservationService<'a> {
    store: &'a dyn Store,
}

impl<'a> ReservationService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Book berth `catway`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for bad fields or an end date not
    /// after the start date, and `ServiceError::NotFound` if the berth does
    /// not exist.
    pub async fn create(
        &self,
        catway: CatwayNumber,
        draft: &ReservationDraft,
    ) -> Result<Reservation, ServiceError> {
        let new = validate_reservation(catway, draft)?;
        check_interval(new.start_date, new.end_date)?;

        if self.store.find_catway(catway).await?.is_none() {
            return Err(ServiceError::NotFound("catway"));
        }

        let reservation = self
            .store
            .insert_reservation(&new)
            .await
            .map_err(|e| match e {
                // The berth vanished between the check and the insert.
                RepositoryError::Reference(_) => ServiceError::NotFound("catway"),
                other => ServiceError::Repository(other),
            })?;

        tracing::info!(
            reservation_id = %reservation.id,
            catway_number = %catway,
            start = %reservation.start_date,
            end = %reservation.end_date,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Reservations matching `filter`, by ascending start date then id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    pub async fn list(&self, filter: ReservationFilter) -> Result<Vec<Reservation>, ServiceError> {
        Ok(self.store.list_reservations(filter).await?)
    }

    /// Reservations active at `now`, across every berth.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    pub async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Reservation>, ServiceError> {
        self.list(ReservationFilter::active_at(now)).await
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` unless both the id and the berth match.
    pub async fn get(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
    ) -> Result<Reservation, ServiceError> {
        self.store
            .find_reservation(catway, id)
            .await?
            .ok_or(ServiceError::NotFound("reservation"))
    }

    /// Apply a partial update. The merged date range must stay valid.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for a scoped miss and
    /// `ServiceError::Validation` for bad fields or an invalid merged range;
    /// nothing is written in either case.
    pub async fn update(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
        draft: &ReservationDraft,
    ) -> Result<Reservation, ServiceError> {
        let current = self.get(catway, id).await?;
        let patch = validate_reservation_patch(draft)?;

        let merged = patch.apply(current.changes());
        check_interval(merged.start_date, merged.end_date)?;

        let updated = self
            .store
            .update_reservation(catway, id, &merged)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound("reservation"),
                other => ServiceError::Repository(other),
            })?;

        tracing::info!(reservation_id = %id, catway_number = %catway, "reservation updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` unless both the id and the berth match.
    pub async fn delete(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
    ) -> Result<(), ServiceError> {
        if !self.store.delete_reservation(catway, id).await? {
            return Err(ServiceError::NotFound("reservation"));
        }
        tracing::info!(reservation_id = %id, catway_number = %catway, "reservation deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use harbormaster_core::CatwayType;

    use super::*;
    use crate::db::{CatwayRepository, MemoryStore};
    use crate::models::NewCatway;

    fn number(n: i64) -> CatwayNumber {
        CatwayNumber::new(n).unwrap()
    }

    async fn store_with_catways(numbers: &[i64]) -> MemoryStore {
        let store = MemoryStore::new();
        for &n in numbers {
            store
                .insert_catway(&NewCatway {
                    catway_number: number(n),
                    catway_type: CatwayType::Long,
                    catway_state: "good".to_string(),
                })
                .await
                .unwrap();
        }
        store
    }

    fn draft(start: &str, end: &str) -> ReservationDraft {
        ReservationDraft {
            client_name: Some("Jo".to_string()),
            boat_name: Some("Wave".to_string()),
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_checks_order_then_berth() {
        let store = store_with_catways(&[1]).await;
        let reservations = ReservationService::new(&store);

        let inverted = reservations
            .create(number(1), &draft("2024-01-10", "2024-01-05"))
            .await
            .unwrap_err();
        assert!(matches!(inverted, ServiceError::Validation(_)));
        assert!(reservations
            .list(ReservationFilter::default())
            .await
            .unwrap()
            .is_empty());

        let missing = reservations
            .create(number(2), &draft("2024-01-10", "2024-01-15"))
            .await
            .unwrap_err();
        assert!(matches!(missing, ServiceError::NotFound("catway")));

        reservations
            .create(number(1), &draft("2024-01-10", "2024-01-15"))
            .await
            .unwrap();
        let scoped = reservations
            .list(ReservationFilter::for_catway(number(1)))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
    }

    #[tokio::test]
    async fn test_scoped_lookup_misses_other_berth() {
        let store = store_with_catways(&[1, 2]).await;
        let reservations = ReservationService::new(&store);
        let r = reservations
            .create(number(1), &draft("2024-01-10", "2024-01-15"))
            .await
            .unwrap();

        assert!(matches!(
            reservations.get(number(2), r.id).await,
            Err(ServiceError::NotFound("reservation"))
        ));
        assert!(matches!(
            reservations
                .update(number(2), r.id, &ReservationDraft::default())
                .await,
            Err(ServiceError::NotFound("reservation"))
        ));
        assert!(matches!(
            reservations.delete(number(2), r.id).await,
            Err(ServiceError::NotFound("reservation"))
        ));
        assert_eq!(reservations.get(number(1), r.id).await.unwrap(), r);
    }

    #[tokio::test]
    async fn test_update_validates_merged_range() {
        let store = store_with_catways(&[1]).await;
        let reservations = ReservationService::new(&store);
        let r = reservations
            .create(number(1), &draft("2024-01-10", "2024-01-15"))
            .await
            .unwrap();

        // Only the end date supplied, but it precedes the stored start.
        let err = reservations
            .update(
                number(1),
                r.id,
                &ReservationDraft {
                    end_date: Some("2024-01-09".to_string()),
                    ..ReservationDraft::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(reservations.get(number(1), r.id).await.unwrap(), r);

        let updated = reservations
            .update(
                number(1),
                r.id,
                &ReservationDraft {
                    boat_name: Some("Swell".to_string()),
                    end_date: Some("2024-01-20".to_string()),
                    ..ReservationDraft::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.boat_name, "Swell");
        assert_eq!(updated.client_name, "Jo");
        assert_eq!(updated.start_date, r.start_date);
    }

    #[tokio::test]
    async fn test_list_active_closed_interval() {
        let store = store_with_catways(&[1, 2]).await;
        let reservations = ReservationService::new(&store);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let current = reservations
            .create(number(1), &draft("2024-06-01T12:00:00Z", "2024-06-03"))
            .await
            .unwrap();
        reservations
            .create(number(2), &draft("2024-05-01", "2024-05-10"))
            .await
            .unwrap();
        let ending_now = reservations
            .create(number(2), &draft("2024-05-30", "2024-06-01T12:00:00Z"))
            .await
            .unwrap();

        let active = reservations.list_active(now).await.unwrap();
        assert_eq!(active, vec![ending_now.clone(), current.clone()]);
        assert!(is_active(&current, now));
        assert!(!is_active(&current, now - Duration::seconds(1)));
    }

    #[tokio::test]
    async fn test_overlapping_reservations_are_accepted() {
        let store = store_with_catways(&[1]).await;
        let reservations = ReservationService::new(&store);
        reservations
            .create(number(1), &draft("2024-01-10", "2024-01-15"))
            .await
            .unwrap();
        assert!(reservations
            .create(number(1), &draft("2024-01-12", "2024-01-20"))
            .await
            .is_ok());
    }
}
