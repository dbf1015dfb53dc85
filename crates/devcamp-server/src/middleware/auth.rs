//! Authentication extractors
//!
//! [`CurrentUser`] resolves the session token (bearer header first, then the
//! `token` cookie) to a stored user. Any failure along the way is a 401 with
//! the same message, so clients cannot tell a bad signature from a deleted
//! account.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::auth::{cookie::token_from_headers, UNAUTHORIZED_MESSAGE};
use crate::error::AppError;
use crate::features::FeatureState;
use crate::models::{user::USER_COLUMNS, Role, User, UserRecord};

/// Roles allowed to write bootcamps and courses
pub const PUBLISHER_ROLES: &[Role] = &[Role::Publisher, Role::Admin];

/// The authenticated requester
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Fail with 403 unless the user has one of `roles`
    pub fn require_role(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.0.role) {
            return Ok(());
        }

        tracing::warn!(user_id = %self.0.id, role = %self.0.role, "Role check failed");

        Err(AppError::forbidden(format!(
            "User role {} is not authorized to access this route",
            self.0.role
        )))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    FeatureState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = FeatureState::from_ref(state);

        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| AppError::unauthorized(UNAUTHORIZED_MESSAGE))?;

        let claims = state.sessions.tokens().verify(&token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            AppError::unauthorized(UNAUTHORIZED_MESSAGE)
        })?;

        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(claims.sub)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::unauthorized(UNAUTHORIZED_MESSAGE))?;

        Ok(CurrentUser(record.into()))
    }
}

/// An authenticated admin; anyone else gets 403
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    FeatureState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        user.require_role(&[Role::Admin])?;
        Ok(AdminUser(user.0))
    }
}
