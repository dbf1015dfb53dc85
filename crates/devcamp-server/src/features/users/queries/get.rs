use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::features::users::{user_not_found, USERS};

#[derive(Debug, Clone, Copy)]
pub struct GetUserQuery {
    pub id: Uuid,
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetUserQuery) -> AppResult<Value> {
    USERS
        .fetch_by_id(&pool, query.id)
        .await?
        .ok_or_else(|| user_not_found(query.id))
}
