use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::features::users::user_not_found;

#[derive(Debug, Clone, Copy)]
pub struct DeleteUserCommand {
    pub id: Uuid,
}

/// Delete a user; their bootcamps and courses go with them
#[tracing::instrument(skip(pool), fields(user_id = %command.id))]
pub async fn handle(pool: PgPool, command: DeleteUserCommand) -> AppResult<()> {
    let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(command.id)
        .execute(&pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(user_not_found(command.id));
    }

    tracing::info!("User deleted");
    Ok(())
}
