//! Database layer for the API.
//!
//! All tables live in the `store` schema:
//! - `store.users` - accounts, password hashes, persisted refresh tokens
//! - `store.products` - the catalog
//! - `store.orders` - order headers with shipping and status
//! - `store.order_items` - line items with price snapshots
//!
//! Each table gets a repository struct borrowing the shared [`PgPool`].
//! Migrations are not run automatically on startup; apply them with
//! `tam-cli migrate`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod orders;
pub mod products;
pub mod users;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data failed domain validation on the way out
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Row not found
    #[error("not found")]
    NotFound,

    /// Unique constraint violated
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
