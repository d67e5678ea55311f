//! User account storage.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tamarind_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::User;

/// Row shape shared by user queries. Never includes the password hash.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("user {}: invalid email: {e}", row.id))
        })?;
        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row shape for credential checks; the only query that reads the hash.
#[derive(Debug, sqlx::FromRow)]
struct UserWithPasswordRow {
    id: i32,
    name: String,
    email: String,
    password_hash: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserWithPasswordRow> for (User, String) {
    type Error = RepositoryError;

    fn try_from(row: UserWithPasswordRow) -> Result<Self, Self::Error> {
        let user = UserRow {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
        .try_into()?;
        Ok((user, row.password_hash))
    }
}

/// Repository for user accounts.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new repository backed by the given pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the email is already registered.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO store.users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, role, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("email {email} is already registered"));
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Fetch a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, role, created_at, updated_at
            FROM store.users
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Fetch a user by email along with the stored password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(
            r"
            SELECT id, name, email, password_hash, role, created_at, updated_at
            FROM store.users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Persist the refresh token issued at login.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the user does not exist.
    pub async fn set_refresh_token(
        &self,
        id: UserId,
        refresh_token: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE store.users
            SET refresh_token = $2, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(refresh_token)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Drop the stored refresh token. A no-op for unknown users so that
    /// logout stays idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn clear_refresh_token(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE store.users
            SET refresh_token = NULL, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_row() -> UserRow {
        UserRow {
            id: 7,
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            role: Role::Customer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_user() {
        let user: User = sample_row().try_into().unwrap();
        assert_eq!(user.id, UserId::new(7));
        assert_eq!(user.email.as_str(), "asha@example.com");
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn test_row_with_bad_email_is_corruption() {
        let mut row = sample_row();
        row.email = "not-an-email".to_string();
        let result: Result<User, _> = row.try_into();
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }

    #[test]
    fn test_password_row_splits_hash() {
        let row = UserWithPasswordRow {
            id: 7,
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Manager,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let (user, hash): (User, String) = row.try_into().unwrap();
        assert!(user.role.is_manager());
        assert_eq!(hash, "$argon2id$stub");
    }
}
