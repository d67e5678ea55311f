//! Authentication extractors.
//!
//! The authentication gate for every protected handler. A token is
//! resolved from the `accessToken` cookie first, then from the
//! `Authorization: Bearer` header, verified against the issuer, and the
//! user record is loaded by subject id. Handlers that take [`CurrentUser`]
//! or [`RequireManager`] cannot run without an authenticated caller.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn my_orders(CurrentUser(user): CurrentUser) -> impl IntoResponse {
//!     format!("orders for {}", user.email)
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use cookie::Cookie;

use crate::db::users::UserRepository;
use crate::error::ApiError;
use crate::middleware::cookies::ACCESS_TOKEN_COOKIE;
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires an authenticated caller.
///
/// Rejects with 401 when no token is present, verification fails, or the
/// subject no longer exists.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)
            .ok_or_else(|| ApiError::Unauthenticated("Authentication required".to_string()))?;

        let claims = state
            .tokens()
            .verify_access(&token)
            .map_err(|_| ApiError::Unauthenticated("Invalid or expired token".to_string()))?;
        let user_id = claims
            .subject_id()
            .map_err(|_| ApiError::Unauthenticated("Invalid or expired token".to_string()))?;

        let user = UserRepository::new(state.pool())
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("Invalid or expired token".to_string()))?;

        Ok(Self(user))
    }
}

/// Extractor that requires an authenticated manager.
///
/// Rejects with 401 like [`CurrentUser`], or with 403 when the caller is
/// authenticated but not a manager.
pub struct RequireManager(pub User);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.role.is_manager() {
            return Err(ApiError::Forbidden(
                "Only managers may access this resource".to_string(),
            ));
        }

        Ok(Self(user))
    }
}

/// Resolve a bearer token from the request: cookie first, then the
/// `Authorization` header.
fn token_from_parts(parts: &Parts) -> Option<String> {
    if let Some(token) = token_from_cookies(parts) {
        return Some(token);
    }

    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

fn token_from_cookies(parts: &Parts) -> Option<String> {
    // Clients may send multiple Cookie headers; check each.
    for header in parts.headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for cookie in Cookie::split_parse(raw).flatten() {
            if cookie.name() == ACCESS_TOKEN_COOKIE && !cookie.value().is_empty() {
                return Some(cookie.value().to_string());
            }
        }
    }
    None
}
