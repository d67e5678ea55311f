//! Unified error handling for all API endpoints.
//!
//! Every handler returns [`ApiError`] for failures. Its `IntoResponse`
//! renders the standard envelope with `data: null`, maps each variant to an
//! HTTP status, and reports server-side failures to Sentry. Messages exposed
//! to clients are chosen per variant; raw database and hashing errors never
//! leak through.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response::ApiResponse;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;
use crate::services::tokens::TokenError;
use crate::validate::ValidationErrors;

/// Application error type for API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Credential or account operation failed
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Bearer or cookie token failed verification
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Order lifecycle operation failed
    #[error("order error: {0}")]
    Order(#[from] OrderError),

    /// Malformed or invalid request input
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Authenticated but not allowed
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Requested entity absent or not visible to the caller
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate unique field
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected server-side failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::BadRequest(errors.to_string())
    }
}

impl ApiError {
    /// HTTP status and client-safe message for this error.
    ///
    /// Server-side failures all collapse to a generic message; the real
    /// error is logged and sent to Sentry instead.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            Self::Auth(err) => Self::auth_status_and_message(err),
            Self::Token(_) => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            Self::Order(err) => Self::order_status_and_message(err),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        }
    }

    fn auth_status_and_message(err: &AuthError) -> (StatusCode, String) {
        match err {
            AuthError::InvalidEmail(_) => {
                (StatusCode::BAD_REQUEST, "Invalid email address".to_string())
            }
            AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Unknown email and wrong password both collapse to this variant
            // in the service, so the endpoint cannot be used to probe which
            // accounts exist.
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AuthError::UserAlreadyExists => (
                StatusCode::CONFLICT,
                "User already exists with this email".to_string(),
            ),
            AuthError::PasswordHash | AuthError::Repository(_) | AuthError::Token(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }

    fn order_status_and_message(err: &OrderError) -> (StatusCode, String) {
        match err {
            OrderError::EmptyCart => (StatusCode::BAD_REQUEST, "Cart is empty".to_string()),
            OrderError::ProductNotFound(id) => {
                (StatusCode::BAD_REQUEST, format!("Product not found: {id}"))
            }
            OrderError::InvalidQuantity => (
                StatusCode::BAD_REQUEST,
                "Quantity must be a positive integer".to_string(),
            ),
            OrderError::NotFound => (StatusCode::NOT_FOUND, "Order not found".to_string()),
            OrderError::AlreadyProcessed => (
                StatusCode::BAD_REQUEST,
                "Order is already confirmed or processed".to_string(),
            ),
            OrderError::Repository(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            sentry::capture_error(&self);
        }

        ApiResponse::new(status, None::<()>, message).into_response()
    }
}

/// Convenience result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
