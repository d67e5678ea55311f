//! CLI command implementations.

pub mod manager;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Database URL from `TAMARIND_DATABASE_URL`, falling back to the generic
/// `DATABASE_URL` (used by managed postgres attach).
pub(crate) fn database_url() -> Result<SecretString, &'static str> {
    std::env::var("TAMARIND_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "TAMARIND_DATABASE_URL is not set")
}
