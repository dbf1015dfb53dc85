//! Forgot password command
//!
//! Stores the SHA-256 of a fresh reset token on the user and mails the
//! plaintext token as a link. When the mail cannot be sent the stored token
//! is cleared again.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::ResetToken;
use crate::error::{AppError, AppResult};
use crate::features::auth::find_by_email;
use crate::features::shared::validation::require;
use crate::mailer::{Email, Mailer};

pub const RESET_SUBJECT: &str = "Password reset";

/// Request body of `POST /auth/forgot`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordCommand {
    pub email: Option<String>,
}

/// `<base>/api/v1/auth/forgot/update/<token>`
pub fn reset_url(base_url: &str, token: &str) -> String {
    format!(
        "{}/api/v1/auth/forgot/update/{}",
        base_url.trim_end_matches('/'),
        token
    )
}

pub fn reset_email(to: &str, url: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: RESET_SUBJECT.to_string(),
        text: format!(
            "You are receiving this email because you (or someone else) requested a password reset. \
             Make a PUT request to:\n\n{}\n\nThe link expires in 10 minutes.",
            url
        ),
        html: format!(
            "<p>You are receiving this email because you (or someone else) requested a password reset.</p>\
             <p><a target=\"_blank\" href=\"{url}\">{url}</a></p>\
             <p>The link expires in 10 minutes.</p>",
            url = url
        ),
    }
}

async fn clear_reset_token(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET reset_password_token = NULL, reset_password_expires_at = NULL WHERE id = $1",
    )
    .bind(user_id)
    .execute(pool)
    .await
    .map(|_| ())
}

/// Issue a reset token for the account with this email and mail the link
///
/// # Errors
///
/// - `NotFound` when no account uses the email
/// - `Upstream` when the mail cannot be sent; the token is cleared first
#[tracing::instrument(skip(pool, mailer, command, base_url))]
pub async fn handle(
    pool: PgPool,
    mailer: &dyn Mailer,
    base_url: &str,
    command: ForgotPasswordCommand,
) -> AppResult<()> {
    let email = require(command.email.as_deref(), "Please provide an email")?;

    let user = find_by_email(&pool, email)
        .await?
        .ok_or_else(|| AppError::not_found(format!("There is no user with email - {}", email)))?;

    let reset = ResetToken::generate();

    sqlx::query(
        "UPDATE users SET reset_password_token = $1, reset_password_expires_at = $2 WHERE id = $3",
    )
    .bind(&reset.hash)
    .bind(reset.expires_at)
    .bind(user.id)
    .execute(&pool)
    .await?;

    let message = reset_email(&user.email, &reset_url(base_url, &reset.token));

    if let Err(err) = mailer.send(message).await {
        tracing::warn!(user_id = %user.id, error = %err, "Reset email failed, clearing token");
        clear_reset_token(&pool, user.id).await?;
        return Err(err.into());
    }

    tracing::info!(user_id = %user.id, "Reset email sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_url() {
        assert_eq!(
            reset_url("http://localhost:5000/", "abc123"),
            "http://localhost:5000/api/v1/auth/forgot/update/abc123"
        );
    }

    #[test]
    fn test_reset_email_carries_link() {
        let url = reset_url("https://devcamp.io", "abc123");
        let email = reset_email("jane@example.com", &url);
        assert_eq!(email.subject, RESET_SUBJECT);
        assert_eq!(email.to, "jane@example.com");
        assert!(email.text.contains(&url));
        assert!(email.html.contains(&format!("href=\"{}\"", url)));
    }
}
