use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::verify_password;
use crate::error::{AppError, AppResult};
use crate::features::auth::find_by_email;

pub const CREDENTIALS_REQUIRED: &str = "Email and password is required";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Request body of `POST /auth/login`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginCommand {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginCommand {
    pub fn validate(&self) -> Result<(), AppError> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !present(&self.email) || !present(&self.password) {
            return Err(AppError::validation(CREDENTIALS_REQUIRED));
        }
        Ok(())
    }
}

/// Check the credentials and return the user id
///
/// An unknown email and a wrong password fail the same way.
#[tracing::instrument(skip(pool, command))]
pub async fn handle(pool: PgPool, command: LoginCommand) -> AppResult<Uuid> {
    command.validate()?;

    let email = command.email.unwrap_or_default();
    let password = command.password.unwrap_or_default();

    let Some(user) = find_by_email(&pool, &email).await? else {
        tracing::debug!("Login for unknown email");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(password, user.password_hash).await? {
        tracing::debug!(user_id = %user.id, "Login with wrong password");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_fields_required() {
        let cmd = LoginCommand {
            email: Some("john@gmail.com".to_string()),
            password: None,
        };
        assert_eq!(cmd.validate().unwrap_err().to_string(), CREDENTIALS_REQUIRED);

        let cmd = LoginCommand {
            email: Some(" ".to_string()),
            password: Some("123456".to_string()),
        };
        assert!(cmd.validate().is_err());

        let cmd = LoginCommand {
            email: Some("john@gmail.com".to_string()),
            password: Some("123456".to_string()),
        };
        assert!(cmd.validate().is_ok());
    }
}
