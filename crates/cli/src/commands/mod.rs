//! Subcommand implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use harbormaster_api::services::ServiceError;
use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Fixture file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Fixture file is not the expected JSON.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    /// A record was rejected by the domain rules.
    #[error("{context}: {source}")]
    Rejected {
        context: String,
        source: ServiceError,
    },
}

/// Connect using `HARBORMASTER_DATABASE_URL`, falling back to `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("HARBORMASTER_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("HARBORMASTER_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(harbormaster_api::db::create_pool(&database_url).await?)
}
