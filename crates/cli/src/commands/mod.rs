//! CLI command implementations.

pub mod migrate;
pub mod person;
pub mod seed;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

use chaldal_storefront::db::RepositoryError;
use chaldal_storefront::services::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Could not read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    SeedFormat(#[from] serde_yaml::Error),

    #[error("Seed data refers to unknown category: {0}")]
    UnknownCategory(String),
}

/// Connect to the storefront database named by the environment.
///
/// # Errors
///
/// Returns `CommandError::MissingEnvVar` when no URL is set.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CHALDAL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("CHALDAL_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}
