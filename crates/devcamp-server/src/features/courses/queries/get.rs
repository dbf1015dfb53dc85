use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::features::courses::{course_not_found, COURSES};

#[derive(Debug, Clone, Copy)]
pub struct GetCourseQuery {
    pub id: Uuid,
}

/// Course document with its bootcamp summary
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetCourseQuery) -> AppResult<Value> {
    COURSES
        .fetch_by_id(&pool, query.id)
        .await?
        .ok_or_else(|| course_not_found(query.id))
}
