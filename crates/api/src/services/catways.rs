//! Berth management.

use harbormaster_core::CatwayNumber;

use super::ServiceError;
use crate::db::{CatwayRepository, RepositoryError, ReservationRepository, Store};
use crate::models::Catway;
use crate::validation::{CatwayDraft, CatwayStateDraft, validate_catway, validate_catway_state};

/// Berth service.
pub struct CatwayService<'a> {
    store: &'a dyn Store,
}

impl<'a> CatwayService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Create a berth.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for bad fields and
    /// `ServiceError::Conflict` if the number is taken.
    pub async fn create(&self, draft: &CatwayDraft) -> Result<Catway, ServiceError> {
        let new = validate_catway(draft)?;
        let catway = self.store.insert_catway(&new).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => ServiceError::Conflict(format!(
                "catway {} already exists",
                new.catway_number
            )),
            other => ServiceError::Repository(other),
        })?;

        tracing::info!(
            catway_number = %catway.catway_number,
            catway_type = %catway.catway_type,
            "catway created"
        );
        Ok(catway)
    }

    /// Every berth, by ascending number.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    pub async fn list(&self) -> Result<Vec<Catway>, ServiceError> {
        Ok(self.store.list_catways().await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no berth has this number.
    pub async fn get(&self, number: CatwayNumber) -> Result<Catway, ServiceError> {
        self.store
            .find_catway(number)
            .await?
            .ok_or(ServiceError::NotFound("catway"))
    }

    /// Replace the condition report, the only mutable field.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a missing, blank or oversized
    /// state and `ServiceError::NotFound` for an unknown berth.
    pub async fn update_state(
        &self,
        number: CatwayNumber,
        draft: &CatwayStateDraft,
    ) -> Result<Catway, ServiceError> {
        let state = validate_catway_state(draft)?;
        let catway = self
            .store
            .update_catway_state(number, &state)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound("catway"),
                other => ServiceError::Repository(other),
            })?;

        tracing::info!(catway_number = %number, "catway state updated");
        Ok(catway)
    }

    /// Delete a berth that no reservation references.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` for an unknown berth and
    /// `ServiceError::Conflict` while reservations still point at it.
    pub async fn delete(&self, number: CatwayNumber) -> Result<(), ServiceError> {
        self.get(number).await?;

        let reservations = self.store.count_reservations_for_catway(number).await?;
        if reservations > 0 {
            return Err(still_referenced(number, reservations));
        }

        let deleted = self.store.delete_catway(number).await.map_err(|e| match e {
            RepositoryError::Reference(_) => still_referenced(number, 1),
            other => ServiceError::Repository(other),
        })?;
        if !deleted {
            return Err(ServiceError::NotFound("catway"));
        }

        tracing::info!(catway_number = %number, "catway deleted");
        Ok(())
    }
}

fn still_referenced(number: CatwayNumber, reservations: i64) -> ServiceError {
    ServiceError::Conflict(format!(
        "catway {number} still has {reservations} reservation(s)"
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::db::{MemoryStore, ReservationRepository};
    use crate::models::NewReservation;

    fn draft(number: i64, kind: &str, state: &str) -> CatwayDraft {
        CatwayDraft {
            catway_number: Some(number),
            catway_type: Some(kind.to_string()),
            catway_state: Some(state.to_string()),
        }
    }

    fn number(n: i64) -> CatwayNumber {
        CatwayNumber::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_duplicate() {
        let store = MemoryStore::new();
        let catways = CatwayService::new(&store);

        let created = catways.create(&draft(1, "long", "good")).await.unwrap();
        assert_eq!(created.catway_number, number(1));

        let err = catways.create(&draft(1, "short", "new")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(catways.get(number(1)).await.unwrap().catway_state, "good");
    }

    #[tokio::test]
    async fn test_list_sorted_by_number() {
        let store = MemoryStore::new();
        let catways = CatwayService::new(&store);
        for n in [7, 2, 5] {
            catways.create(&draft(n, "short", "ok")).await.unwrap();
        }

        let numbers: Vec<i32> = catways
            .list()
            .await
            .unwrap()
            .iter()
            .map(|c| c.catway_number.as_i32())
            .collect();
        assert_eq!(numbers, vec![2, 5, 7]);
    }

    #[tokio::test]
    async fn test_update_state_only() {
        let store = MemoryStore::new();
        let catways = CatwayService::new(&store);
        catways.create(&draft(3, "long", "good")).await.unwrap();

        let updated = catways
            .update_state(
                number(3),
                &CatwayStateDraft {
                    catway_state: Some("needs paint".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.catway_state, "needs paint");

        let missing = catways
            .update_state(number(3), &CatwayStateDraft::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, ServiceError::Validation(_)));

        let unknown = catways
            .update_state(
                number(99),
                &CatwayStateDraft {
                    catway_state: Some("x".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(unknown, ServiceError::NotFound("catway")));
    }

    #[tokio::test]
    async fn test_delete_denied_while_reserved() {
        let store = MemoryStore::new();
        let catways = CatwayService::new(&store);
        catways.create(&draft(4, "long", "good")).await.unwrap();

        let start = Utc::now();
        let reservation = store
            .insert_reservation(&NewReservation {
                catway_number: number(4),
                client_name: "Jo".to_string(),
                boat_name: "Wave".to_string(),
                start_date: start,
                end_date: start + Duration::days(1),
            })
            .await
            .unwrap();

        assert!(matches!(
            catways.delete(number(4)).await,
            Err(ServiceError::Conflict(_))
        ));

        store
            .delete_reservation(number(4), reservation.id)
            .await
            .unwrap();
        catways.delete(number(4)).await.unwrap();
        assert!(matches!(
            catways.delete(number(4)).await,
            Err(ServiceError::NotFound("catway"))
        ));
    }
}
