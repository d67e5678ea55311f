//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tamarind_core::{Email, Role, UserId};

/// A registered account.
///
/// The password hash and refresh token stay in the database layer; this
/// type has no field for them, so responses are sanitized by construction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_without_secrets() {
        let user = User {
            id: UserId::new(7),
            name: "Asha".to_string(),
            email: Email::parse("asha@example.com").unwrap(),
            role: Role::Customer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["email"], "asha@example.com");
        assert_eq!(value["role"], "customer");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("refreshToken").is_none());
    }
}
