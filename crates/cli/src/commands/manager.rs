//! Manager account management commands.
//!
//! # Usage
//!
//! ```bash
//! tam-cli manager create -e staff@example.com -n "Staff Name" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `TAMARIND_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use tamarind_core::{Email, Role};

use tamarind_api::db::RepositoryError;
use tamarind_api::db::users::UserRepository;
use tamarind_api::services::auth::{self, AuthError};

/// Errors that can occur during manager operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password failed the account policy.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Account already exists.
    #[error("An account already exists with email: {0}")]
    UserExists(String),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing failed.
    #[error("Password hashing failed")]
    PasswordHash,
}

/// Create a new manager account.
///
/// # Errors
///
/// Returns `ManagerError` if validation fails, the email is taken, or the
/// database is unreachable.
///
/// # Returns
///
/// The id of the created account.
pub async fn create(email: &str, name: &str, password: &str) -> Result<i32, ManagerError> {
    dotenvy::dotenv().ok();

    let email =
        Email::parse(email).map_err(|e| ManagerError::InvalidEmail(format!("{e}")))?;

    auth::validate_password(password).map_err(|e| match e {
        AuthError::WeakPassword(msg) => ManagerError::WeakPassword(msg),
        _ => ManagerError::PasswordHash,
    })?;
    let password_hash =
        auth::hash_password(password).map_err(|_| ManagerError::PasswordHash)?;

    let database_url = super::database_url().map_err(ManagerError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Creating manager account: {}", email);
    let user = UserRepository::new(&pool)
        .create(name, &email, &password_hash, Role::Manager)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => ManagerError::UserExists(email.to_string()),
            other => ManagerError::Repository(other),
        })?;

    tracing::info!(
        "Manager created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id.as_i32())
}
