//! Account registration handler.

use axum::extract::State;
use serde::Deserialize;
use tamarind_core::Role;

use crate::error::Result;
use crate::extract::AppJson;
use crate::models::User;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::state::AppState;
use crate::validate::Validator;

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Defaults to `customer` when absent.
    #[serde(default)]
    pub role: Role,
}

impl RegisterBody {
    fn validate(&self) -> Result<()> {
        let mut v = Validator::new();
        v.require("name", &self.name);
        v.require("email", &self.email);
        v.require("password", &self.password);
        v.finish()?;
        Ok(())
    }
}

/// `POST /user/register` - create a new account.
///
/// The response body is the sanitized user; the password hash and refresh
/// token have no field to appear in.
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterBody>,
) -> Result<ApiResponse<User>> {
    body.validate()?;

    let service = AuthService::new(state.pool(), state.tokens());
    let user = service
        .register(body.name.trim(), &body.email, &body.password, body.role)
        .await?;

    tracing::info!(user_id = %user.id, "account registered");
    Ok(ApiResponse::created(user, "User registered successfully"))
}
