use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::features::shared::validation::{require, validate_email, validate_max_len, ValidationError};
use crate::features::users::commands::create::{EMAIL_REQUIRED, NAME_REQUIRED, NAME_TOO_LONG};
use crate::models::{user::USER_COLUMNS, User, UserRecord};

/// Request body of `PUT /account/details`; role and password are not accepted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDetailsCommand {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateDetailsCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_some() {
            let name = require(self.name.as_deref(), NAME_REQUIRED)?;
            validate_max_len(name, 100, NAME_TOO_LONG)?;
        }
        if self.email.is_some() {
            validate_email(require(self.email.as_deref(), EMAIL_REQUIRED)?)?;
        }
        Ok(())
    }
}

fn build_update(user_id: Uuid, command: &UpdateDetailsCommand) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE users SET updated_at = NOW()");
    if let Some(name) = &command.name {
        qb.push(", name = ").push_bind(name.trim());
    }
    if let Some(email) = &command.email {
        qb.push(", email = ").push_bind(email.trim());
    }
    qb.push(" WHERE id = ").push_bind(user_id);
    qb.push(" RETURNING ").push(USER_COLUMNS);
    qb
}

/// Change the requester's name and email, returning the updated user
#[tracing::instrument(skip(pool, command), fields(user_id = %user_id))]
pub async fn handle(pool: PgPool, user_id: Uuid, command: UpdateDetailsCommand) -> AppResult<User> {
    command.validate()?;

    let record = build_update(user_id, &command)
        .build_query_as::<UserRecord>()
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::unauthorized(crate::auth::UNAUTHORIZED_MESSAGE))?;

    tracing::info!("Account details updated");

    Ok(record.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_update_returns_user_columns() {
        let cmd = UpdateDetailsCommand {
            name: Some("New Name".to_string()),
            email: None,
        };
        let qb = build_update(Uuid::new_v4(), &cmd);
        assert_eq!(
            qb.sql(),
            format!(
                "UPDATE users SET updated_at = NOW(), name = $1 WHERE id = $2 RETURNING {}",
                USER_COLUMNS
            )
        );
    }

    #[test]
    fn test_role_is_ignored() {
        let cmd: UpdateDetailsCommand =
            serde_json::from_value(serde_json::json!({"email": "a@b.io", "role": "admin"})).unwrap();
        assert!(cmd.validate().is_ok());
        assert_eq!(cmd.email.as_deref(), Some("a@b.io"));
    }
}
