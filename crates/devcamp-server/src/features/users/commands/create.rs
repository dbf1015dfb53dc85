//! Create user command
//!
//! Admins may create accounts with any role. Self-registration in
//! `features::auth` reuses [`insert_user`] with its own role rule.

use serde::Deserialize;
use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::AppResult;
use crate::features::shared::validation::{
    require, validate_email, validate_max_len, validate_password, ValidationError,
};
use crate::features::users::{user_not_found, USERS};
use crate::models::Role;

pub(crate) const NAME_REQUIRED: &str = "User name is required";
pub(crate) const NAME_TOO_LONG: &str = "Name can not be more than 100 characters";
pub(crate) const EMAIL_REQUIRED: &str = "User email is required";

/// Check a name and email pair
pub(crate) fn validate_identity(name: Option<&str>, email: Option<&str>) -> Result<(), ValidationError> {
    let name = require(name, NAME_REQUIRED)?;
    validate_max_len(name, 100, NAME_TOO_LONG)?;
    validate_email(require(email, EMAIL_REQUIRED)?)?;
    Ok(())
}

/// Insert a user with an already hashed password
pub(crate) async fn insert_user<'e, E>(
    executor: E,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<Uuid, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        r#"
        INSERT INTO users (name, email, role, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(name.trim())
    .bind(email.trim())
    .bind(role)
    .bind(password_hash)
    .fetch_one(executor)
    .await
}

/// Request body of `POST /users`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserCommand {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl CreateUserCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_identity(self.name.as_deref(), self.email.as_deref())?;
        validate_password(self.password.as_deref().unwrap_or_default())?;
        Ok(())
    }
}

/// Create a user and return its document
#[tracing::instrument(skip(pool, command), fields(role = ?command.role))]
pub async fn handle(pool: PgPool, command: CreateUserCommand) -> AppResult<Value> {
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

    tracing::info!(user_id = %id, "User created");

    USERS
        .fetch_by_id(&pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))
}
