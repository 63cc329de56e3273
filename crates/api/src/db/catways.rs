//! Berth repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use harbormaster_core::{CatwayId, CatwayNumber, CatwayType};

use super::{PgStore, RepositoryError};
use crate::models::{Catway, NewCatway};

/// Storage operations on berths, addressed by their business number.
#[async_trait]
pub trait CatwayRepository: Send + Sync {
    /// Insert a new berth.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the number is already taken.
    async fn insert_catway(&self, catway: &NewCatway) -> Result<Catway, RepositoryError>;

    /// All berths, by ascending number.
    async fn list_catways(&self) -> Result<Vec<Catway>, RepositoryError>;

    async fn find_catway(&self, number: CatwayNumber) -> Result<Option<Catway>, RepositoryError>;

    /// Replace the condition report.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no berth has this number.
    async fn update_catway_state(
        &self,
        number: CatwayNumber,
        state: &str,
    ) -> Result<Catway, RepositoryError>;

    /// Delete by number. Returns `false` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Reference` while reservations still point at
    /// the berth.
    async fn delete_catway(&self, number: CatwayNumber) -> Result<bool, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct CatwayRow {
    id: i32,
    catway_number: CatwayNumber,
    catway_type: String,
    catway_state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CatwayRow> for Catway {
    type Error = RepositoryError;

    fn try_from(row: CatwayRow) -> Result<Self, Self::Error> {
        let catway_type: CatwayType = row.catway_type.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid catway type in database: {e}"))
        })?;
        Ok(Self {
            id: CatwayId::new(row.id),
            catway_number: row.catway_number,
            catway_type,
            catway_state: row.catway_state,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const CATWAY_COLUMNS: &str =
    "id, catway_number, catway_type, catway_state, created_at, updated_at";

#[async_trait]
impl CatwayRepository for PgStore {
    async fn insert_catway(&self, catway: &NewCatway) -> Result<Catway, RepositoryError> {
        let row: CatwayRow = sqlx::query_as(&format!(
            "INSERT INTO catways (catway_number, catway_type, catway_state) \
             VALUES ($1, $2, $3) RETURNING {CATWAY_COLUMNS}"
        ))
        .bind(catway.catway_number)
        .bind(catway.catway_type.as_str())
        .bind(&catway.catway_state)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "catway number already exists", "catway"))?;

        row.try_into()
    }

    async fn list_catways(&self) -> Result<Vec<Catway>, RepositoryError> {
        let rows: Vec<CatwayRow> = sqlx::query_as(&format!(
            "SELECT {CATWAY_COLUMNS} FROM catways ORDER BY catway_number ASC"
        ))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(Catway::try_from).collect()
    }

    async fn find_catway(&self, number: CatwayNumber) -> Result<Option<Catway>, RepositoryError> {
        let row: Option<CatwayRow> = sqlx::query_as(&format!(
            "SELECT {CATWAY_COLUMNS} FROM catways WHERE catway_number = $1"
        ))
        .bind(number)
        .fetch_optional(self.pool())
        .await?;

        row.map(Catway::try_from).transpose()
    }

    async fn update_catway_state(
        &self,
        number: CatwayNumber,
        state: &str,
    ) -> Result<Catway, RepositoryError> {
        let row: Option<CatwayRow> = sqlx::query_as(&format!(
            "UPDATE catways SET catway_state = $2, updated_at = NOW() \
             WHERE catway_number = $1 RETURNING {CATWAY_COLUMNS}"
        ))
        .bind(number)
        .bind(state)
        .fetch_optional(self.pool())
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete_catway(&self, number: CatwayNumber) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM catways WHERE catway_number = $1")
            .bind(number)
            .execute(self.pool())
            .await
            .map_err(|e| {
                RepositoryError::from_write(e, "catway", "catway still has reservations")
            })?;

        Ok(result.rows_affected() > 0)
    }
}
