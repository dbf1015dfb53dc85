//! Ownership policy for user-owned rows
//!
//! A write on a bootcamp or course loads the row's owner first, so a missing
//! row is a 404 before any permission check. The requester then has to be the
//! owner or an admin.

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Owned, User};

/// Load `(id, user_id)` of a row in `table`, locking it for the transaction
///
/// `table` must be a trusted table name. Returns `Ok(None)` when no row has
/// this id.
pub async fn load_owned<'e, E>(executor: E, table: &'static str, id: Uuid) -> AppResult<Option<Owned>>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("SELECT id, user_id FROM {} WHERE id = $1 FOR UPDATE", table);
    let owned = sqlx::query_as::<_, Owned>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(owned)
}

/// Fail with 403 unless `requester` owns the row or is an admin
///
/// `action` completes the sentence "User X is not authorized to ...".
pub fn ensure_owner(owned: &Owned, requester: &User, action: &str) -> AppResult<()> {
    if owned.user_id == requester.id || requester.is_admin() {
        return Ok(());
    }

    tracing::warn!(
        resource_id = %owned.id,
        owner_id = %owned.user_id,
        user_id = %requester.id,
        "Ownership check failed"
    );

    Err(AppError::forbidden(format!(
        "User {} is not authorized to {}",
        requester.id, action
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use axum::http::StatusCode;
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Someone".to_string(),
            email: "someone@example.com".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_may_write() {
        let owner = user(Role::Publisher);
        let owned = Owned {
            id: Uuid::new_v4(),
            user_id: owner.id,
        };
        assert!(ensure_owner(&owned, &owner, "update this bootcamp").is_ok());
    }

    #[test]
    fn test_admin_may_write_anything() {
        let owned = Owned {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        };
        assert!(ensure_owner(&owned, &user(Role::Admin), "delete this course").is_ok());
    }

    #[test]
    fn test_other_publisher_is_forbidden() {
        let intruder = user(Role::Publisher);
        let owned = Owned {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        };

        let err = ensure_owner(&owned, &intruder, "update this bootcamp").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.to_string(),
            format!("User {} is not authorized to update this bootcamp", intruder.id)
        );
    }
}
