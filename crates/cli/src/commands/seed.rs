//! Seed the database with a demo manager and a starter catalog.
//!
//! Intended for development environments. The demo manager's password
//! comes from `SEED_MANAGER_PASSWORD` so seeded databases never share a
//! hardcoded credential; seeding refuses to run without it.

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use tamarind_core::{Email, Price, Role};

use tamarind_api::db::RepositoryError;
use tamarind_api::db::products::ProductRepository;
use tamarind_api::db::users::UserRepository;
use tamarind_api::models::NewProduct;
use tamarind_api::services::auth;

/// Demo manager account email.
const SEED_MANAGER_EMAIL: &str = "manager@tamarind.dev";

/// Starter catalog, name / price / category / description / image.
const SEED_PRODUCTS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "Clay Teapot",
        "24.50",
        "kitchen",
        "Hand-thrown teapot with a bamboo handle",
        "https://cdn.tamarind.dev/seed/teapot.jpg",
    ),
    (
        "Linen Apron",
        "32.00",
        "kitchen",
        "Stonewashed linen apron with leather straps",
        "https://cdn.tamarind.dev/seed/apron.jpg",
    ),
    (
        "Walnut Serving Board",
        "48.00",
        "kitchen",
        "End-grain walnut board, food-safe oil finish",
        "https://cdn.tamarind.dev/seed/board.jpg",
    ),
    (
        "Wool Throw Blanket",
        "89.00",
        "home",
        "Lambswool throw in undyed natural tones",
        "https://cdn.tamarind.dev/seed/throw.jpg",
    ),
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing failed.
    #[error("Password hashing failed")]
    PasswordHash,

    /// Seed data failed domain validation.
    #[error("Invalid seed data: {0}")]
    InvalidSeedData(String),
}

/// Insert the demo manager and starter catalog.
///
/// Idempotent on the manager: a second run reuses the existing account
/// but inserts the catalog again.
///
/// # Errors
///
/// Returns `SeedError` if the environment is incomplete or an insert
/// fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = super::database_url().map_err(SeedError::MissingEnvVar)?;
    let password = std::env::var("SEED_MANAGER_PASSWORD")
        .map_err(|_| SeedError::MissingEnvVar("SEED_MANAGER_PASSWORD"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let manager_id = seed_manager(&pool, &password).await?;
    seed_catalog(&pool, manager_id).await?;

    tracing::info!("Seeding complete!");
    Ok(())
}

async fn seed_manager(
    pool: &PgPool,
    password: &str,
) -> Result<tamarind_core::UserId, SeedError> {
    let email = Email::parse(SEED_MANAGER_EMAIL)
        .map_err(|e| SeedError::InvalidSeedData(format!("manager email: {e}")))?;
    let users = UserRepository::new(pool);

    let password_hash = auth::hash_password(password).map_err(|_| SeedError::PasswordHash)?;

    match users
        .create("Demo Manager", &email, &password_hash, Role::Manager)
        .await
    {
        Ok(user) => {
            tracing::info!("Demo manager created: {} (id {})", email, user.id);
            Ok(user.id)
        }
        Err(RepositoryError::Conflict(_)) => {
            let (user, _) = users
                .get_with_password(&email)
                .await?
                .ok_or(RepositoryError::NotFound)?;
            tracing::info!("Demo manager already exists: {} (id {})", email, user.id);
            Ok(user.id)
        }
        Err(other) => Err(other.into()),
    }
}

async fn seed_catalog(
    pool: &PgPool,
    manager_id: tamarind_core::UserId,
) -> Result<(), SeedError> {
    let products = ProductRepository::new(pool);

    for (name, price, category, description, image) in SEED_PRODUCTS {
        let price: Decimal = price
            .parse()
            .map_err(|_| SeedError::InvalidSeedData(format!("{name}: bad price")))?;
        let price = Price::new(price)
            .map_err(|e| SeedError::InvalidSeedData(format!("{name}: {e}")))?;

        let product = products
            .create(&NewProduct {
                name: (*name).to_string(),
                price,
                category: (*category).to_string(),
                description: (*description).to_string(),
                image: (*image).to_string(),
                created_by: manager_id,
            })
            .await?;

        tracing::info!("Seeded product: {} (id {})", product.name, product.id);
    }

    Ok(())
}
