//! JWT issuing and verification.
//!
//! Access and refresh tokens are HS256 JWTs signed with independent
//! secrets, so a leaked refresh secret cannot mint access tokens and vice
//! versa. All signing material is injected through [`TokenConfig`] at
//! construction; nothing reads the environment at verification time.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tamarind_core::{Role, UserId};
use thiserror::Error;

use crate::config::TokenConfig;

/// Token failures.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing a new token failed
    #[error("token encoding failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    /// Signature, expiry, or structure check failed
    #[error("invalid or expired token")]
    Verification(#[source] jsonwebtoken::errors::Error),

    /// The `sub` claim is not a numeric user id
    #[error("token subject is not a numeric user id")]
    InvalidSubject,
}

/// Claims carried by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string per JWT convention
    pub sub: String,
    /// Role at issue time
    pub role: Role,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

impl Claims {
    /// Parse the subject back into a [`UserId`].
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidSubject`] if `sub` is not a decimal i32.
    pub fn subject_id(&self) -> Result<UserId, TokenError> {
        self.sub
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| TokenError::InvalidSubject)
    }
}

/// The access/refresh pair minted at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies the two token kinds.
#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenIssuer {
    /// Build an issuer from validated configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let access = config.access_secret.expose_secret().as_bytes();
        let refresh = config.refresh_secret.expose_secret().as_bytes();
        Self {
            access_encoding: EncodingKey::from_secret(access),
            access_decoding: DecodingKey::from_secret(access),
            refresh_encoding: EncodingKey::from_secret(refresh),
            refresh_decoding: DecodingKey::from_secret(refresh),
            access_ttl_secs: i64::try_from(config.access_ttl_secs).unwrap_or(i64::MAX),
            refresh_ttl_secs: i64::try_from(config.refresh_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Mint a fresh access/refresh pair for a user.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<TokenPair, TokenError> {
        let now = Utc::now().timestamp();
        let access_token = Self::encode(
            user_id,
            role,
            now,
            now + self.access_ttl_secs,
            &self.access_encoding,
        )?;
        let refresh_token = Self::encode(
            user_id,
            role,
            now,
            now + self.refresh_ttl_secs,
            &self.refresh_encoding,
        )?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify an access token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Verification`] for a bad signature, expired
    /// token, or malformed structure.
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        Self::verify(token, &self.access_decoding)
    }

    /// Verify a refresh token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Verification`] for a bad signature, expired
    /// token, or malformed structure.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        Self::verify(token, &self.refresh_decoding)
    }

    /// Access token lifetime in seconds, for cookie max-age.
    #[must_use]
    pub const fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// Refresh token lifetime in seconds, for cookie max-age.
    #[must_use]
    pub const fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    fn encode(
        user_id: UserId,
        role: Role,
        iat: i64,
        exp: i64,
        key: &EncodingKey,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat,
            exp,
        };
        jsonwebtoken::encode(&Header::default(), &claims, key).map_err(TokenError::Encoding)
    }

    fn verify(token: &str, key: &DecodingKey) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, key, &Validation::new(Algorithm::HS256))
            .map_err(TokenError::Verification)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    const ACCESS_KEY: &str = "kP9#mW2$vB7@nX4&qJ8!tR5^yH1*zG3d";
    const REFRESH_KEY: &str = "fL6!cN0@xS9#wQ2$bV5^mK8&jD4*hT7e";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&TokenConfig {
            access_secret: SecretString::from(ACCESS_KEY),
            refresh_secret: SecretString::from(REFRESH_KEY),
            access_ttl_secs: 900,
            refresh_ttl_secs: 604_800,
        })
    }

    #[test]
    fn test_issue_then_verify_access() {
        let issuer = issuer();
        let pair = issuer.issue(UserId::new(7), Role::Manager).unwrap();

        let claims = issuer.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.subject_id().unwrap(), UserId::new(7));
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_issue_then_verify_refresh() {
        let issuer = issuer();
        let pair = issuer.issue(UserId::new(7), Role::Customer).unwrap();

        let claims = issuer.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(claims.exp - claims.iat, 604_800);
    }

    #[test]
    fn test_kinds_are_not_interchangeable() {
        let issuer = issuer();
        let pair = issuer.issue(UserId::new(7), Role::Customer).unwrap();

        assert!(issuer.verify_refresh(&pair.access_token).is_err());
        assert!(issuer.verify_access(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_tampered_token_fails() {
        let issuer = issuer();
        let pair = issuer.issue(UserId::new(7), Role::Customer).unwrap();

        let mut tampered = pair.access_token;
        tampered.pop();
        tampered.push('A');
        assert!(issuer.verify_access(&tampered).is_err());
    }

    #[test]
    fn test_expired_token_fails() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        // Past the default 60s verification leeway
        let claims = Claims {
            sub: "7".to_string(),
            role: Role::Customer,
            iat: now - 300,
            exp: now - 120,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(ACCESS_KEY.as_bytes()),
        )
        .unwrap();

        let err = issuer.verify_access(&token).unwrap_err();
        assert!(matches!(err, TokenError::Verification(_)));
    }

    #[test]
    fn test_garbage_subject_rejected() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            role: Role::Customer,
            iat: 0,
            exp: 0,
        };
        assert!(matches!(
            claims.subject_id(),
            Err(TokenError::InvalidSubject)
        ));
    }
}
