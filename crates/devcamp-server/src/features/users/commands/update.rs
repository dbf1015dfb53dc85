use serde::Deserialize;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::create::{EMAIL_REQUIRED, NAME_REQUIRED, NAME_TOO_LONG};
use crate::auth::hash_password;
use crate::error::AppResult;
use crate::features::shared::validation::{
    require, validate_email, validate_max_len, validate_password, ValidationError,
};
use crate::features::users::{user_not_found, USERS};
use crate::models::Role;

/// Request body of `PUT /users/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserCommand {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_some() {
            let name = require(self.name.as_deref(), NAME_REQUIRED)?;
            validate_max_len(name, 100, NAME_TOO_LONG)?;
        }
        if self.email.is_some() {
            validate_email(require(self.email.as_deref(), EMAIL_REQUIRED)?)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

fn build_update<'a>(
    id: Uuid,
    command: &'a UpdateUserCommand,
    password_hash: Option<String>,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE users SET updated_at = NOW()");

    if let Some(name) = &command.name {
        qb.push(", name = ").push_bind(name.trim());
    }
    if let Some(email) = &command.email {
        qb.push(", email = ").push_bind(email.trim());
    }
    if let Some(role) = command.role {
        qb.push(", role = ").push_bind(role);
    }
    if let Some(hash) = password_hash {
        qb.push(", password_hash = ").push_bind(hash);
    }

    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING id");
    qb
}

/// Update a user and return its document
#[tracing::instrument(skip(pool, command), fields(user_id = %id))]
pub async fn handle(pool: PgPool, id: Uuid, command: UpdateUserCommand) -> AppResult<Value> {
    command.validate()?;

    let password_hash = match command.password.clone() {
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };

    let updated: Option<Uuid> = build_update(id, &command, password_hash)
        .build_query_scalar()
        .fetch_optional(&pool)
        .await?;

    if updated.is_none() {
        return Err(user_not_found(id));
    }

    tracing::info!("User updated");

    USERS
        .fetch_by_id(&pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))
}
