use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, UNAUTHORIZED_MESSAGE};
use crate::error::{AppError, AppResult};
use crate::features::shared::validation::{require, validate_password, ValidationError};

pub const PASSWORD_INCORRECT: &str = "Password is incorrect";
pub const CURRENT_PASSWORD_REQUIRED: &str = "Current password is required";

/// Request body of `PUT /account/password`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordCommand {
    pub current_password: Option<String>,
    #[serde(alias = "password")]
    pub new_password: Option<String>,
}

impl UpdatePasswordCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(self.current_password.as_deref(), CURRENT_PASSWORD_REQUIRED)?;
        validate_password(self.new_password.as_deref().unwrap_or_default())
    }
}

/// Replace the requester's password after checking the current one
#[tracing::instrument(skip(pool, command), fields(user_id = %user_id))]
pub async fn handle(pool: PgPool, user_id: Uuid, command: UpdatePasswordCommand) -> AppResult<()> {
    command.validate()?;

    // Compared untrimmed, as login does
    let current = command.current_password.unwrap_or_default();

    let stored: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::unauthorized(UNAUTHORIZED_MESSAGE))?;

    if !verify_password(current, stored).await? {
        return Err(AppError::validation(PASSWORD_INCORRECT));
    }

    let password_hash = hash_password(command.new_password.unwrap_or_default()).await?;

    sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
        .bind(&password_hash)
        .bind(user_id)
        .execute(&pool)
        .await?;

    tracing::info!("Account password changed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(current: &str, new: &str) -> UpdatePasswordCommand {
        UpdatePasswordCommand {
            current_password: Some(current.to_string()),
            new_password: Some(new.to_string()),
        }
    }

    #[test]
    fn test_padded_passwords_are_accepted() {
        assert!(command(" secret1 ", "  other2  ").validate().is_ok());
    }

    #[test]
    fn test_blank_current_password_is_rejected() {
        assert_eq!(
            command("   ", "secret2").validate(),
            Err(ValidationError::Required(CURRENT_PASSWORD_REQUIRED))
        );
    }

    #[test]
    fn test_short_new_password_is_rejected() {
        assert!(matches!(
            command("secret1", "123").validate(),
            Err(ValidationError::PasswordTooShort { .. })
        ));
    }

    #[test]
    fn test_password_alias() {
        let cmd: UpdatePasswordCommand = serde_json::from_value(serde_json::json!({
            "currentPassword": "secret1",
            "password": "secret2"
        }))
        .unwrap();
        assert_eq!(cmd.new_password.as_deref(), Some("secret2"));
    }
}
