use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::features::bootcamps::bootcamp_not_found;
use crate::features::courses::COURSES;

#[derive(Debug, Clone, Copy)]
pub struct ListBootcampCoursesQuery {
    pub bootcamp_id: Uuid,
}

/// Every course of one bootcamp, newest first, unpaginated
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: ListBootcampCoursesQuery) -> AppResult<Vec<Value>> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM bootcamps WHERE id = $1)")
        .bind(query.bootcamp_id)
        .fetch_one(&pool)
        .await?;

    if !exists {
        return Err(bootcamp_not_found(query.bootcamp_id));
    }

    let courses = COURSES
        .fetch_by_parent(&pool, "t.bootcamp_id", query.bootcamp_id)
        .await?;

    Ok(courses)
}
