//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `person` - Identity row shared by every role (email, phone, password hash)
//! - `users`, `seller`, `admin`, `rider` - Role subtype rows keyed by `person_id`
//! - `category`, `products` - Catalog
//! - `area` - Delivery zones with a flat delivery fee
//! - `address`, `person_address` - Saved addresses, one per (person, label)
//! - `orders`, `order_details`, `payment` - Checkout records
//! - `tower_sessions.session` - Session storage
//!
//! Repositories borrow the pool. Helpers that must run inside a caller's
//! transaction take `&mut PgConnection` instead.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p chaldal-cli -- migrate
//! ```

pub mod addresses;
pub mod areas;
pub mod catalog;
pub mod orders;
pub mod persons;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use areas::AreaRepository;
pub use catalog::CatalogRepository;
pub use orders::OrderRepository;
pub use persons::PersonRepository;

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

    /// Foreign key violation (e.g., unknown category or seller).
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl RepositoryError {
    /// Classify a sqlx error by the constraint it violated.
    #[must_use]
    pub fn from_constraint(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_owned();
            if db_err.is_unique_violation() {
                return Self::Conflict(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return Self::InvalidReference(constraint);
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse a text column through `FromStr`, reporting failures as corruption.
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column} in database: {e}")))
}
