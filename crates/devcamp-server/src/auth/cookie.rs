//! Session cookie and bearer token handling

use axum::http::{
    header::{self, InvalidHeaderValue},
    HeaderMap, HeaderValue,
};

/// Name of the session cookie
pub const TOKEN_COOKIE: &str = "token";

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, max_age_days: i64, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = max_age_days.max(0) * 24 * 60 * 60;
    build(token, max_age, secure)
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    build("", 0, secure)
}

fn build(value: &str, max_age: i64, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        TOKEN_COOKIE, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Token from `Authorization: Bearer ..`, falling back to the session cookie
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
