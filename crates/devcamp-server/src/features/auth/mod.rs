//! Registration, login and password reset
//!
//! Every endpoint that authenticates a user answers with a session: the
//! `token` cookie plus `{success, token}`.

pub mod commands;
pub mod routes;

use sqlx::PgPool;

use crate::models::{user::USER_COLUMNS, UserRecord};

pub use commands::{ForgotPasswordCommand, LoginCommand, RegisterCommand, ResetPasswordCommand};
pub use routes::auth_routes;

/// Load the full user row for `email`
pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
    let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
    sqlx::query_as::<_, UserRecord>(&sql)
        .bind(email.trim())
        .fetch_optional(pool)
        .await
}
