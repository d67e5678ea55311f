//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! All routes below are nested under `/api/v1`.
//!
//! ```text
//! # Accounts
//! POST  /user/register             - Register a new account
//!
//! # Auth
//! POST  /auth/login                - Login, sets auth cookies
//! POST  /auth/logout               - Logout, clears auth cookies (auth)
//! GET   /auth/me                   - Current caller identity (auth)
//!
//! # Catalog
//! GET   /product                   - List products, newest first
//! POST  /product/add               - Create a product (manager)
//! GET   /product/{id}              - Product detail
//!
//! # Orders
//! POST  /orders                    - Create an order from a cart (auth)
//! GET   /orders                    - Caller's orders, newest first (auth)
//! GET   /orders/all                - All orders (manager)
//! GET   /orders/{id}               - One order (owner or manager)
//! PATCH /orders/{id}/confirm-payment - Confirm payment (owner)
//! PATCH /orders/{id}/status        - Set status (manager)
//! ```

pub mod auth;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/register", post(users::register))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list))
        .route("/add", post(products::create))
        .route("/{id}", get(products::show))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list_mine))
        .route("/all", get(orders::list_all))
        .route("/{id}", get(orders::show))
        .route("/{id}/confirm-payment", patch(orders::confirm_payment))
        .route("/{id}/status", patch(orders::update_status))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/user", user_routes())
        .nest("/auth", auth_routes())
        .nest("/product", product_routes())
        .nest("/orders", order_routes())
}
