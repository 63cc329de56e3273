//! In-process store with the same semantics as the `PostgreSQL` schema.
//!
//! Enforces the unique email and unique berth number constraints, and the
//! `ON DELETE RESTRICT` reference from reservations to berths. Used by the
//! test suites.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use harbormaster_core::{CatwayId, CatwayNumber, Email, ReservationId, UserId};

use super::{
    CatwayRepository, RepositoryError, ReservationRepository, Store, UserRepository,
};
use crate::models::{
    Catway, NewCatway, NewReservation, NewUser, Reservation, ReservationChanges,
    ReservationFilter, User, UserChanges,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, (User, String)>,
    catways: BTreeMap<CatwayNumber, Catway>,
    reservations: BTreeMap<ReservationId, Reservation>,
    next_user_id: i32,
    next_catway_id: i32,
    next_reservation_id: i32,
}

impl Tables {
    fn user_by_email(&self, email: &Email) -> Option<&(User, String)> {
        self.users.values().find(|(user, _)| &user.email == email)
    }
}

/// `RwLock`-guarded tables with serial ids.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.user_by_email(&user.email).is_some() {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = UserId::new(next_id(&mut tables.next_user_id));
        let created = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: Utc::now(),
        };
        tables
            .users
            .insert(id, (created.clone(), user.password_hash.clone()));
        Ok(created)
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().map(|(user, _)| user.clone()).collect())
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.user_by_email(email).map(|(user, _)| user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.user_by_email(email).cloned())
    }

    async fn update_user(
        &self,
        email: &Email,
        changes: &UserChanges,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        let (user, hash) = tables
            .users
            .values_mut()
            .find(|(user, _)| &user.email == email)
            .ok_or(RepositoryError::NotFound)?;

        if let Some(username) = &changes.username {
            user.username.clone_from(username);
        }
        if let Some(password_hash) = &changes.password_hash {
            hash.clone_from(password_hash);
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, email: &Email) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let id = tables.user_by_email(email).map(|(user, _)| user.id);
        Ok(id.is_some_and(|id| tables.users.remove(&id).is_some()))
    }
}

#[async_trait]
impl CatwayRepository for MemoryStore {
    async fn insert_catway(&self, catway: &NewCatway) -> Result<Catway, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.catways.contains_key(&catway.catway_number) {
            return Err(RepositoryError::Conflict(
                "catway number already exists".to_owned(),
            ));
        }

        let now = Utc::now();
        let created = Catway {
            id: CatwayId::new(next_id(&mut tables.next_catway_id)),
            catway_number: catway.catway_number,
            catway_type: catway.catway_type,
            catway_state: catway.catway_state.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.catways.insert(created.catway_number, created.clone());
        Ok(created)
    }

    async fn list_catways(&self) -> Result<Vec<Catway>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.catways.values().cloned().collect())
    }

    async fn find_catway(&self, number: CatwayNumber) -> Result<Option<Catway>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.catways.get(&number).cloned())
    }

    async fn update_catway_state(
        &self,
        number: CatwayNumber,
        state: &str,
    ) -> Result<Catway, RepositoryError> {
        let mut tables = self.tables.write().await;
        let catway = tables
            .catways
            .get_mut(&number)
            .ok_or(RepositoryError::NotFound)?;
        state.clone_into(&mut catway.catway_state);
        catway.updated_at = Utc::now();
        Ok(catway.clone())
    }

    async fn delete_catway(&self, number: CatwayNumber) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables
            .reservations
            .values()
            .any(|r| r.catway_number == number)
        {
            return Err(RepositoryError::Reference(
                "catway still has reservations".to_owned(),
            ));
        }
        Ok(tables.catways.remove(&number).is_some())
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Reservation, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.catways.contains_key(&reservation.catway_number) {
            return Err(RepositoryError::Reference("catway does not exist".to_owned()));
        }

        let now = Utc::now();
        let created = Reservation {
            id: ReservationId::new(next_id(&mut tables.next_reservation_id)),
            catway_number: reservation.catway_number,
            client_name: reservation.client_name.clone(),
            boat_name: reservation.boat_name.clone(),
            start_date: reservation.start_date,
            end_date: reservation.end_date,
            created_at: now,
            updated_at: now,
        };
        tables.reservations.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut found: Vec<Reservation> = tables
            .reservations
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        found.sort_by_key(|r| (r.start_date, r.id));
        Ok(found)
    }

    async fn find_reservation(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
    ) -> Result<Option<Reservation>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reservations
            .get(&id)
            .filter(|r| r.catway_number == catway)
            .cloned())
    }

    async fn update_reservation(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
        changes: &ReservationChanges,
    ) -> Result<Reservation, RepositoryError> {
        let mut tables = self.tables.write().await;
        let reservation = tables
            .reservations
            .get_mut(&id)
            .filter(|r| r.catway_number == catway)
            .ok_or(RepositoryError::NotFound)?;

        reservation.client_name.clone_from(&changes.client_name);
        reservation.boat_name.clone_from(&changes.boat_name);
        reservation.start_date = changes.start_date;
        reservation.end_date = changes.end_date;
        reservation.updated_at = Utc::now();
        Ok(reservation.clone())
    }

    async fn delete_reservation(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let matches = tables
            .reservations
            .get(&id)
            .is_some_and(|r| r.catway_number == catway);
        if matches {
            tables.reservations.remove(&id);
        }
        Ok(matches)
    }

    async fn count_reservations_for_catway(
        &self,
        catway: CatwayNumber,
    ) -> Result<i64, RepositoryError> {
        let tables = self.tables.read().await;
        let count = tables
            .reservations
            .values()
            .filter(|r| r.catway_number == catway)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use harbormaster_core::CatwayType;

    use super::*;

    fn number(n: i64) -> CatwayNumber {
        CatwayNumber::new(n).unwrap()
    }

    async fn seed_catway(store: &MemoryStore, n: i64) {
        store
            .insert_catway(&NewCatway {
                catway_number: number(n),
                catway_type: CatwayType::Long,
                catway_state: "ok".to_string(),
            })
            .await
            .unwrap();
    }

    fn booking(n: i64, start_day: u32) -> NewReservation {
        let start = Utc.with_ymd_and_hms(2024, 1, start_day, 0, 0, 0).unwrap();
        NewReservation {
            catway_number: number(n),
            client_name: "Jo".to_string(),
            boat_name: "Wave".to_string(),
            start_date: start,
            end_date: start + Duration::days(3),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let user = NewUser {
            username: "abc".to_string(),
            email: Email::parse("a@b.com").unwrap(),
            password_hash: "hash".to_string(),
        };
        store.insert_user(&user).await.unwrap();
        let err = store.insert_user(&user).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_reservation_requires_catway() {
        let store = MemoryStore::new();
        let err = store.insert_reservation(&booking(9, 1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Reference(_)));
    }

    #[tokio::test]
    async fn test_reservation_scoped_to_catway() {
        let store = MemoryStore::new();
        seed_catway(&store, 1).await;
        seed_catway(&store, 2).await;
        let created = store.insert_reservation(&booking(1, 1)).await.unwrap();

        assert!(store.find_reservation(number(2), created.id).await.unwrap().is_none());
        assert!(!store.delete_reservation(number(2), created.id).await.unwrap());
        assert!(store.find_reservation(number(1), created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_orders_by_start_date() {
        let store = MemoryStore::new();
        seed_catway(&store, 1).await;
        store.insert_reservation(&booking(1, 20)).await.unwrap();
        store.insert_reservation(&booking(1, 5)).await.unwrap();
        store.insert_reservation(&booking(1, 12)).await.unwrap();

        let all = store
            .list_reservations(ReservationFilter::default())
            .await
            .unwrap();
        let days: Vec<_> = all.iter().map(|r| r.start_date).collect();
        let mut sorted = days.clone();
        sorted.sort();
        assert_eq!(days, sorted);
    }

    #[tokio::test]
    async fn test_catway_delete_restricted_by_reservations() {
        let store = MemoryStore::new();
        seed_catway(&store, 3).await;
        let r = store.insert_reservation(&booking(3, 1)).await.unwrap();

        let err = store.delete_catway(number(3)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Reference(_)));

        store.delete_reservation(number(3), r.id).await.unwrap();
        assert!(store.delete_catway(number(3)).await.unwrap());
        assert!(!store.delete_catway(number(3)).await.unwrap());
    }
}
