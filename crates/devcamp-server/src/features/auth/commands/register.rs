use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::AppResult;
use crate::features::shared::validation::{validate_password, ValidationError};
use crate::features::users::commands::create::{insert_user, validate_identity};
use crate::models::Role;

/// Request body of `POST /auth/register`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterCommand {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl RegisterCommand {
    /// Anyone may sign up as a user or publisher, never as an admin
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_identity(self.name.as_deref(), self.email.as_deref())?;
        validate_password(self.password.as_deref().unwrap_or_default())?;

        if self.role == Some(Role::Admin) {
            return Err(ValidationError::OutOfRange(
                "Role admin can not be chosen at registration",
            ));
        }

        Ok(())
    }
}

/// Create the account and return its id
#[tracing::instrument(skip(pool, command), fields(role = ?command.role))]
pub async fn handle(pool: PgPool, command: RegisterCommand) -> AppResult<Uuid> {
    command.validate()?;

    let password_hash = hash_password(command.password.unwrap_or_default()).await?;

    let id = insert_user(
        &pool,
        command.name.as_deref().unwrap_or_default(),
        command.email.as_deref().unwrap_or_default(),
        &password_hash,
        command.role.unwrap_or_default(),
    )
    .await?;

    tracing::info!(user_id = %id, "User registered");

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RegisterCommand {
        RegisterCommand {
            name: Some("John Doe".to_string()),
            email: Some("john@gmail.com".to_string()),
            password: Some("123456".to_string()),
            role: Some(Role::Publisher),
        }
    }

    #[test]
    fn test_publisher_may_register() {
        assert!(valid().validate().is_ok());
        assert!(RegisterCommand { role: None, ..valid() }.validate().is_ok());
    }

    #[test]
    fn test_admin_registration_is_rejected() {
        let cmd = RegisterCommand {
            role: Some(Role::Admin),
            ..valid()
        };
        assert_eq!(
            cmd.validate().unwrap_err().to_string(),
            "Role admin can not be chosen at registration"
        );
    }

    #[test]
    fn test_short_password_is_rejected() {
        let cmd = RegisterCommand {
            password: Some("12345".to_string()),
            ..valid()
        };
        assert!(cmd.validate().is_err());
    }
}
