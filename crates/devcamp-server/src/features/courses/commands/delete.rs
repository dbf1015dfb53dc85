use sqlx::PgPool;
use uuid::Uuid;

use super::{lock_parent_bootcamp, recompute_average_cost};
use crate::error::AppResult;
use crate::features::courses::course_not_found;
use crate::features::shared::ownership::{ensure_owner, load_owned};
use crate::models::User;

#[derive(Debug, Clone, Copy)]
pub struct DeleteCourseCommand {
    pub id: Uuid,
}

/// Delete a course and refresh its bootcamp's average cost
///
/// Returns the new average cost, `None` once the bootcamp has no courses left.
#[tracing::instrument(skip(pool, requester), fields(course_id = %command.id, user_id = %requester.id))]
pub async fn handle(
    pool: PgPool,
    requester: &User,
    command: DeleteCourseCommand,
) -> AppResult<Option<f64>> {
    let id = command.id;
    let mut tx = pool.begin().await?;

    lock_parent_bootcamp(&mut tx, id)
        .await?
        .ok_or_else(|| course_not_found(id))?;

    let owned = load_owned(&mut *tx, "courses", id)
        .await?
        .ok_or_else(|| course_not_found(id))?;
    ensure_owner(&owned, requester, "delete this course")?;

    let bootcamp_id: Uuid =
        sqlx::query_scalar("DELETE FROM courses WHERE id = $1 RETURNING bootcamp_id")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

    let cost = recompute_average_cost(&mut tx, bootcamp_id).await?;

    tx.commit().await?;

    tracing::info!(bootcamp_id = %bootcamp_id, "Course deleted");

    Ok(cost)
}
