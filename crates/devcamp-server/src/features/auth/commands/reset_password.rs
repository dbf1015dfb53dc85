use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::{AppError, AppResult};
use crate::features::shared::validation::{validate_password, ValidationError};

pub const INVALID_TOKEN: &str = "Invalid token";

/// Request body of `PUT /auth/forgot/update/:resetToken`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordCommand {
    #[serde(alias = "password")]
    pub new_password: Option<String>,
}

impl ResetPasswordCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_password(self.new_password.as_deref().unwrap_or_default())
    }
}

/// Set a new password for the holder of an unexpired reset token
///
/// The token is single-use. Returns the user id.
#[tracing::instrument(skip(pool, token, command))]
pub async fn handle(pool: PgPool, token: &str, command: ResetPasswordCommand) -> AppResult<Uuid> {
    command.validate()?;

    let token_hash = devcamp_common::digest::sha256_hex(token);

    let user_id: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM users WHERE reset_password_token = $1 AND reset_password_expires_at > NOW()",
    )
    .bind(&token_hash)
    .fetch_optional(&pool)
    .await?;

    let Some(user_id) = user_id else {
        tracing::debug!("Unknown or expired reset token");
        return Err(AppError::validation(INVALID_TOKEN));
    };

    let password_hash = hash_password(command.new_password.unwrap_or_default()).await?;

    let updated = sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $1,
            reset_password_token = NULL,
            reset_password_expires_at = NULL,
            updated_at = NOW()
        WHERE id = $2 AND reset_password_token = $3
        "#,
    )
    .bind(&password_hash)
    .bind(user_id)
    .bind(&token_hash)
    .execute(&pool)
    .await?
    .rows_affected();

    // A concurrent reset consumed the token first
    if updated == 0 {
        return Err(AppError::validation(INVALID_TOKEN));
    }

    tracing::info!(user_id = %user_id, "Password reset");

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_either_field_name() {
        let new: ResetPasswordCommand =
            serde_json::from_value(serde_json::json!({"newPassword": "abcdef"})).unwrap();
        assert_eq!(new.new_password.as_deref(), Some("abcdef"));

        let plain: ResetPasswordCommand =
            serde_json::from_value(serde_json::json!({"password": "abcdef"})).unwrap();
        assert!(plain.validate().is_ok());
    }

    #[test]
    fn test_missing_password_is_rejected() {
        assert!(ResetPasswordCommand::default().validate().is_err());
    }
}
