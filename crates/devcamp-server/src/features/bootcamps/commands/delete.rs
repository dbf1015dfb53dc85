//! Delete bootcamp command
//!
//! The bootcamp's courses are removed in the same transaction before the
//! bootcamp itself.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::features::bootcamps::bootcamp_not_found;
use crate::features::shared::ownership::{ensure_owner, load_owned};
use crate::models::User;

#[derive(Debug, Clone, Copy)]
pub struct DeleteBootcampCommand {
    pub id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBootcampResponse {
    pub id: Uuid,
    pub courses_deleted: u64,
}

/// Delete a bootcamp and every course it lists
///
/// # Errors
///
/// - `NotFound` when no bootcamp has this id
/// - `Forbidden` unless `requester` owns it or is an admin
#[tracing::instrument(skip(pool, requester), fields(bootcamp_id = %command.id, user_id = %requester.id))]
pub async fn handle(
    pool: PgPool,
    requester: &User,
    command: DeleteBootcampCommand,
) -> AppResult<DeleteBootcampResponse> {
    let id = command.id;
    let mut tx = pool.begin().await?;

    let owned = load_owned(&mut *tx, "bootcamps", id)
        .await?
        .ok_or_else(|| bootcamp_not_found(id))?;
    ensure_owner(&owned, requester, "delete this bootcamp")?;

    let courses_deleted = sqlx::query("DELETE FROM courses WHERE bootcamp_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM bootcamps WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(courses_deleted, "Bootcamp deleted");

    Ok(DeleteBootcampResponse {
        id,
        courses_deleted,
    })
}
