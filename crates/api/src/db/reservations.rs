//! Reservation repository.
//!
//! Reservations are always addressed through their berth: a lookup with the
//! right id but the wrong `catway_number` finds nothing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use harbormaster_core::{CatwayNumber, ReservationId};

use super::{PgStore, RepositoryError};
use crate::models::{NewReservation, Reservation, ReservationChanges, ReservationFilter};

/// Storage operations on reservations.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a new reservation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Reference` if the berth does not exist.
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Reservation, RepositoryError>;

    /// Reservations matching `filter`, by ascending start date then id.
    async fn list_reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, RepositoryError>;

    async fn find_reservation(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
    ) -> Result<Option<Reservation>, RepositoryError>;

    /// Overwrite the mutable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the pair does not match.
    async fn update_reservation(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
        changes: &ReservationChanges,
    ) -> Result<Reservation, RepositoryError>;

    /// Delete by berth and id. Returns `false` when nothing matched.
    async fn delete_reservation(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
    ) -> Result<bool, RepositoryError>;

    /// Number of reservations (past, current or future) on a berth.
    async fn count_reservations_for_catway(
        &self,
        catway: CatwayNumber,
    ) -> Result<i64, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: i32,
    catway_number: CatwayNumber,
    client_name: String,
    boat_name: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Self {
            id: ReservationId::new(row.id),
            catway_number: row.catway_number,
            client_name: row.client_name,
            boat_name: row.boat_name,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const RESERVATION_COLUMNS: &str = "id, catway_number, client_name, boat_name, \
     start_date, end_date, created_at, updated_at";

#[async_trait]
impl ReservationRepository for PgStore {
    async fn insert_reservation(
        &self,
        reservation: &NewReservation,
    ) -> Result<Reservation, RepositoryError> {
        let row: ReservationRow = sqlx::query_as(&format!(
            "INSERT INTO reservations \
             (catway_number, client_name, boat_name, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(reservation.catway_number)
        .bind(&reservation.client_name)
        .bind(&reservation.boat_name)
        .bind(reservation.start_date)
        .bind(reservation.end_date)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "reservation", "catway does not exist"))?;

        Ok(row.into())
    }

    async fn list_reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE ($1::INT IS NULL OR catway_number = $1) \
               AND ($2::TIMESTAMPTZ IS NULL OR (start_date <= $2 AND end_date >= $2)) \
             ORDER BY start_date ASC, id ASC"
        ))
        .bind(filter.catway)
        .bind(filter.active_at)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    async fn find_reservation(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
    ) -> Result<Option<Reservation>, RepositoryError> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE id = $1 AND catway_number = $2"
        ))
        .bind(id)
        .bind(catway)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Reservation::from))
    }

    async fn update_reservation(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
        changes: &ReservationChanges,
    ) -> Result<Reservation, RepositoryError> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "UPDATE reservations SET \
                 client_name = $3, boat_name = $4, start_date = $5, end_date = $6, \
                 updated_at = NOW() \
             WHERE id = $1 AND catway_number = $2 RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(id)
        .bind(catway)
        .bind(&changes.client_name)
        .bind(&changes.boat_name)
        .bind(changes.start_date)
        .bind(changes.end_date)
        .fetch_optional(self.pool())
        .await?;

        row.map(Reservation::from).ok_or(RepositoryError::NotFound)
    }

    async fn delete_reservation(
        &self,
        catway: CatwayNumber,
        id: ReservationId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1 AND catway_number = $2")
            .bind(id)
            .bind(catway)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_reservations_for_catway(
        &self,
        catway: CatwayNumber,
    ) -> Result<i64, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reservations WHERE catway_number = $1")
                .bind(catway)
                .fetch_one(self.pool())
                .await?;

        Ok(count)
    }
}
