use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::features::bootcamps::{bootcamp_not_found, BOOTCAMPS};

#[derive(Debug, Clone, Copy)]
pub struct GetBootcampQuery {
    pub id: Uuid,
}

/// Full bootcamp document with its courses
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetBootcampQuery) -> AppResult<Value> {
    BOOTCAMPS
        .fetch_by_id(&pool, query.id)
        .await?
        .ok_or_else(|| bootcamp_not_found(query.id))
}
