//! Auth cookie construction.
//!
//! Both tokens ride in http-only, `SameSite=Strict` cookies scoped to the
//! whole site, with the `Secure` flag on in production. Cookie max-age
//! tracks the token's own TTL so the browser drops it when the token
//! would stop verifying anyway.

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

use crate::services::tokens::{TokenIssuer, TokenPair};

/// Access token cookie name.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Refresh token cookie name.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

fn auth_cookie(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

fn append(headers: &mut HeaderMap, cookie: &Cookie<'static>) {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        headers.append(SET_COOKIE, value);
    }
}

/// Set both auth cookies for a freshly issued token pair.
pub fn append_auth_cookies(
    headers: &mut HeaderMap,
    pair: &TokenPair,
    issuer: &TokenIssuer,
    secure: bool,
) {
    append(
        headers,
        &auth_cookie(
            ACCESS_TOKEN_COOKIE,
            pair.access_token.clone(),
            issuer.access_ttl_secs(),
            secure,
        ),
    );
    append(
        headers,
        &auth_cookie(
            REFRESH_TOKEN_COOKIE,
            pair.refresh_token.clone(),
            issuer.refresh_ttl_secs(),
            secure,
        ),
    );
}

/// Clear both auth cookies (logout).
pub fn append_cleared_cookies(headers: &mut HeaderMap, secure: bool) {
    for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
        append(headers, &auth_cookie(name, String::new(), 0, secure));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_attributes() {
        let cookie = auth_cookie(ACCESS_TOKEN_COOKIE, "tok".to_string(), 900, false);
        let rendered = cookie.to_string();
        assert!(rendered.starts_with("accessToken=tok"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Strict"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=900"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn test_secure_flag_in_production() {
        let cookie = auth_cookie(REFRESH_TOKEN_COOKIE, "tok".to_string(), 60, true);
        assert!(cookie.to_string().contains("Secure"));
    }

    #[test]
    fn test_cleared_cookies_expire_immediately() {
        let mut headers = HeaderMap::new();
        append_cleared_cookies(&mut headers, false);

        let values: Vec<&str> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values.len(), 2);
        assert!(values[0].starts_with("accessToken=;"));
        assert!(values[1].starts_with("refreshToken=;"));
        for value in values {
            assert!(value.contains("Max-Age=0"));
        }
    }
}
