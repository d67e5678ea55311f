//! Login, logout, and current-user handlers.

use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::extract::AppJson;
use crate::middleware::{CurrentUser, append_auth_cookies, append_cleared_cookies};
use crate::models::User;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::state::AppState;
use crate::validate::Validator;

/// Login request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.require("email", &self.email);
        v.require("password", &self.password);
        v.finish()?;
        Ok(())
    }
}

/// `POST /auth/login` - authenticate and set auth cookies.
///
/// Unknown email and wrong password answer identically, so the endpoint
/// cannot be used to probe which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginBody>,
) -> Result<(HeaderMap, ApiResponse<serde_json::Value>)> {
    body.validate()?;

    let service = AuthService::new(state.pool(), state.tokens());
    let (user, pair) = service.login(&body.email, &body.password).await?;

    let mut headers = HeaderMap::new();
    append_auth_cookies(
        &mut headers,
        &pair,
        state.tokens(),
        state.config().environment.is_production(),
    );

    tracing::info!(user_id = %user.id, "login");
    let payload = json!({ "user": user, "accessToken": pair.access_token });
    Ok((headers, ApiResponse::ok(payload, "Logged in successfully")))
}

/// `POST /auth/logout` - revoke the refresh token and clear cookies.
///
/// The cookies are cleared even when the store cannot be reached, so the
/// caller is never stuck logged in from the client's perspective. The
/// failed revocation is logged instead of failing the request.
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> (HeaderMap, ApiResponse<serde_json::Value>) {
    let service = AuthService::new(state.pool(), state.tokens());
    if let Err(error) = service.logout(user.id).await {
        tracing::warn!(user_id = %user.id, %error, "failed to revoke refresh token");
    }

    let mut headers = HeaderMap::new();
    append_cleared_cookies(&mut headers, state.config().environment.is_production());

    (
        headers,
        ApiResponse::ok(serde_json::Value::Null, "Logged out successfully"),
    )
}

/// `GET /auth/me` - the authenticated caller's identity.
pub async fn me(CurrentUser(user): CurrentUser) -> ApiResponse<User> {
    ApiResponse::ok(user, "Current user fetched successfully")
}
