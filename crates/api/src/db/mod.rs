//! Persistence for the harbour office.
//!
//! # Database: `harbormaster`
//!
//! ## Tables
//!
//! - `users` - Office accounts (unique email, argon2 password hash)
//! - `catways` - Berths, keyed by their unique `catway_number`
//! - `reservations` - Bookings, referencing `catways.catway_number`
//! - `tower_sessions.session` - Session storage (session auth mode only)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p harbormaster-cli -- migrate
//! ```
//!
//! Every repository is an `async_trait` so the services can run against
//! [`PgStore`] in production and [`MemoryStore`] in tests.

pub mod catways;
pub mod memory;
pub mod reservations;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catways::CatwayRepository;
pub use memory::MemoryStore;
pub use reservations::ReservationRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Foreign key violation: the referenced record is missing, or still
    /// referenced on delete.
    #[error("reference violation: {0}")]
    Reference(String),
}

impl RepositoryError {
    /// Classify a write error, turning constraint violations into
    /// [`Conflict`](Self::Conflict) or [`Reference`](Self::Reference).
    pub(crate) fn from_write(e: sqlx::Error, conflict: &str, reference: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::Reference(reference.to_owned());
            }
        }
        Self::Database(e)
    }
}

/// Everything the services need from storage.
#[async_trait]
pub trait Store: UserRepository + CatwayRepository + ReservationRepository + Send + Sync {
    /// Check that the backing storage answers.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
