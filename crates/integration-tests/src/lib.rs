//! Integration tests for Tamarind.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the API
//! cargo run -p tamarind-cli -- migrate
//! cargo run -p tamarind-api
//!
//! # Run integration tests (ignored by default)
//! cargo test -p tamarind-integration-tests -- --ignored
//! ```
//!
//! Tests talk to a running server over HTTP; they are `#[ignore]`d so a
//! plain `cargo test` stays self-contained. The order lifecycle tests
//! additionally need a manager account, supplied via `MANAGER_EMAIL` and
//! `MANAGER_PASSWORD` (create one with `tam-cli manager create`).

use reqwest::Client;
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("TAMARIND_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client with a cookie store, so auth cookies set at login ride
/// along on later requests like a browser's would.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email for this test run, so reruns never collide on the
/// unique constraint.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

/// Manager credentials from the environment.
///
/// # Panics
///
/// Panics with a pointer to `tam-cli manager create` when unset.
#[must_use]
pub fn manager_credentials() -> (String, String) {
    let email = std::env::var("MANAGER_EMAIL")
        .expect("MANAGER_EMAIL not set; create one with tam-cli manager create");
    let password = std::env::var("MANAGER_PASSWORD")
        .expect("MANAGER_PASSWORD not set; create one with tam-cli manager create");
    (email, password)
}
