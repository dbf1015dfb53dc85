//! Authentication building blocks
//!
//! - **token**: HS256 session tokens
//! - **password**: Argon2id hashing on the blocking pool
//! - **cookie**: `Set-Cookie` values and token lookup in request headers
//!
//! [`Sessions`] ties tokens to the cookie settings so every endpoint that logs
//! a user in answers the same way: a `token` cookie plus `{success, token}`.

pub mod cookie;
pub mod password;
pub mod token;

use axum::{
    http::header::SET_COOKIE,
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde_json::json;
use uuid::Uuid;

use crate::api::response::{ApiResponse, TokenResponse};
use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};

pub use password::{hash_password, verify_password, PasswordError};
pub use token::{Claims, TokenError, TokenIssuer};

/// Message for every missing, malformed or expired credential
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized!";

/// Random bytes in a password reset token
pub const RESET_TOKEN_BYTES: usize = 20;

/// Lifetime of a password reset token
pub const RESET_TOKEN_TTL_MINUTES: i64 = 10;

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Sign(e) => AppError::Internal(format!("Token signing failed: {}", e)),
            TokenError::Invalid(_) => AppError::unauthorized(UNAUTHORIZED_MESSAGE),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Issues session tokens and the cookies that carry them
#[derive(Debug, Clone)]
pub struct Sessions {
    tokens: TokenIssuer,
    cookie_expire_days: i64,
    secure_cookie: bool,
}

impl Sessions {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            tokens: TokenIssuer::from_config(config),
            cookie_expire_days: config.cookie_expire_days,
            secure_cookie: config.secure_cookie,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Sign a token for `user_id` and wrap it in a response
    pub fn start(&self, user_id: Uuid) -> AppResult<Session> {
        let token = self.tokens.issue(user_id)?;
        let cookie = cookie::session_cookie(&token, self.cookie_expire_days, self.secure_cookie)
            .map_err(|e| AppError::Internal(format!("Invalid session cookie: {}", e)))?;

        tracing::debug!(user_id = %user_id, "Session issued");

        Ok(Session { token, cookie })
    }

    /// Response that removes the session cookie
    pub fn end(&self) -> AppResult<Logout> {
        let cookie = cookie::clear_cookie(self.secure_cookie)
            .map_err(|e| AppError::Internal(format!("Invalid session cookie: {}", e)))?;
        Ok(Logout { cookie })
    }
}

/// `200 {success, token}` with the session cookie set
#[derive(Debug)]
pub struct Session {
    pub token: String,
    cookie: HeaderValue,
}

impl IntoResponse for Session {
    fn into_response(self) -> Response {
        ([(SET_COOKIE, self.cookie)], Json(TokenResponse::new(self.token))).into_response()
    }
}

/// `200 {success, data: {}}` with the session cookie cleared
#[derive(Debug)]
pub struct Logout {
    cookie: HeaderValue,
}

impl IntoResponse for Logout {
    fn into_response(self) -> Response {
        ([(SET_COOKIE, self.cookie)], ApiResponse::success(json!({}))).into_response()
    }
}

/// A freshly generated password reset token
///
/// `token` goes to the user by email; only `hash` is stored.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token: String,
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        Self {
            hash: devcamp_common::digest::sha256_hex(&token),
            token,
            expires_at: Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expire_days: 30,
            cookie_expire_days: 30,
            secure_cookie: false,
        }
    }

    #[tokio::test]
    async fn test_session_response_sets_cookie_and_body() {
        let sessions = Sessions::new(&config());
        let user_id = Uuid::new_v4();
        let session = sessions.start(user_id).unwrap();
        let token = session.token.clone();

        let response = session.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(&format!("token={};", token)));
        assert!(cookie.contains("HttpOnly"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["token"], token.as_str());

        assert_eq!(sessions.tokens().verify(&token).unwrap().sub, user_id);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let response = Sessions::new(&config()).end().unwrap().into_response();
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"success": true, "data": {}}));
    }

    #[test]
    fn test_reset_token_shape() {
        let reset = ResetToken::generate();
        assert_eq!(reset.token.len(), RESET_TOKEN_BYTES * 2);
        assert_eq!(reset.hash.len(), 64);
        assert_eq!(devcamp_common::digest::sha256_hex(&reset.token), reset.hash);
        assert!(reset.expires_at > Utc::now() + Duration::minutes(9));
        assert_ne!(reset.token, ResetToken::generate().token);
    }

    #[test]
    fn test_invalid_token_is_unauthorized() {
        let err = TokenIssuer::new("a", 1).verify("junk").unwrap_err();
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Unauthorized(ref m) if m == UNAUTHORIZED_MESSAGE));
    }
}
