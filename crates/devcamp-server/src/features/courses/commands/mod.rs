pub mod create;
pub mod delete;
pub mod update;

pub use create::CreateCourseCommand;
pub use delete::DeleteCourseCommand;
pub use update::UpdateCourseCommand;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::average_cost;

/// Lock the bootcamp a course belongs to and return its id
///
/// Must be taken before the course row, the same order course creation
/// uses. `None` when no course has this id.
pub(crate) async fn lock_parent_bootcamp(
    conn: &mut PgConnection,
    course_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT b.id FROM bootcamps b JOIN courses c ON c.bootcamp_id = b.id WHERE c.id = $1 FOR UPDATE OF b",
    )
    .bind(course_id)
    .fetch_optional(&mut *conn)
    .await
}

/// Store `ceil(mean(tuition) / 10) * 10` on the bootcamp, NULL without courses
#[tracing::instrument(skip(conn))]
pub(crate) async fn recompute_average_cost(
    conn: &mut PgConnection,
    bootcamp_id: Uuid,
) -> Result<Option<f64>, sqlx::Error> {
    let mean: Option<f64> =
        sqlx::query_scalar("SELECT AVG(tuition) FROM courses WHERE bootcamp_id = $1")
            .bind(bootcamp_id)
            .fetch_one(&mut *conn)
            .await?;

    let cost = average_cost(mean);

    sqlx::query("UPDATE bootcamps SET average_cost = $1 WHERE id = $2")
        .bind(cost)
        .bind(bootcamp_id)
        .execute(&mut *conn)
        .await?;

    tracing::debug!(average_cost = ?cost, "Bootcamp average cost recomputed");

    Ok(cost)
}
