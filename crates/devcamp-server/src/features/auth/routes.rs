//! Authentication routes
//!
//! # Route Structure
//!
//! - `POST /api/v1/auth/register` - Create an account and start a session
//! - `POST /api/v1/auth/login` - Start a session
//! - `GET /api/v1/auth/me` - The current user
//! - `GET /api/v1/auth/logout` - Clear the session cookie
//! - `POST /api/v1/auth/forgot` - Mail a password reset link
//! - `PUT /api/v1/auth/forgot/update/:resetToken` - Set a new password

use axum::{
    extract::{Host, Path, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use super::commands::{
    self, ForgotPasswordCommand, LoginCommand, RegisterCommand, ResetPasswordCommand,
};
use crate::api::{
    extract::JsonBody,
    response::{ApiResponse, MessageResponse},
};
use crate::error::AppError;
use crate::features::FeatureState;
use crate::middleware::CurrentUser;

pub fn auth_routes() -> Router<FeatureState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", get(logout))
        .route("/forgot", post(forgot_password))
        .route("/forgot/update/:reset_token", put(reset_password))
}

/// `scheme://host` of the incoming request, honouring `X-Forwarded-Proto`
fn request_base_url(host: &str, headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| *v == "http" || *v == "https")
        .unwrap_or("http");

    format!("{}://{}", scheme, host)
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Register an account
///
/// # Endpoint
///
/// `POST /api/v1/auth/register`
///
/// # Response
///
/// - `200 OK` - `{success, token}` plus the `token` cookie
/// - `400 Bad Request` - Validation error, admin role or duplicate name/email
async fn register(
    State(state): State<FeatureState>,
    JsonBody(command): JsonBody<RegisterCommand>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = commands::register::handle(state.db, command).await?;
    state.sessions.start(user_id)
}

/// Log in with email and password
///
/// # Endpoint
///
/// `POST /api/v1/auth/login`
///
/// # Response
///
/// - `200 OK` - `{success, token}` plus the `token` cookie
/// - `400 Bad Request` - `Email and password is required`
/// - `401 Unauthorized` - `Invalid credentials`
async fn login(
    State(state): State<FeatureState>,
    JsonBody(command): JsonBody<LoginCommand>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = commands::login::handle(state.db, command).await?;
    state.sessions.start(user_id)
}

/// Mail a password reset link
///
/// # Endpoint
///
/// `POST /api/v1/auth/forgot`
///
/// # Response
///
/// - `200 OK` - `{success, message: "Email sent"}`
/// - `404 Not Found` - No account with this email
/// - `500 Internal Server Error` - `Email could not be sent`
async fn forgot_password(
    State(state): State<FeatureState>,
    Host(host): Host,
    headers: HeaderMap,
    JsonBody(command): JsonBody<ForgotPasswordCommand>,
) -> Result<impl IntoResponse, AppError> {
    let base_url = request_base_url(&host, &headers);
    commands::forgot_password::handle(state.db, state.mailer.as_ref(), &base_url, command).await?;
    Ok(Json(MessageResponse::new("Email sent")))
}

/// Set a new password using a mailed reset token
///
/// # Endpoint
///
/// `PUT /api/v1/auth/forgot/update/:resetToken`
///
/// # Response
///
/// - `200 OK` - `{success, token}` plus the `token` cookie
/// - `400 Bad Request` - `Invalid token` (unknown, used or expired)
async fn reset_password(
    State(state): State<FeatureState>,
    Path(reset_token): Path<String>,
    JsonBody(command): JsonBody<ResetPasswordCommand>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = commands::reset_password::handle(state.db, &reset_token, command).await?;
    state.sessions.start(user_id)
}

/// Clear the session cookie
///
/// # Endpoint
///
/// `GET /api/v1/auth/logout`
async fn logout(State(state): State<FeatureState>) -> Result<impl IntoResponse, AppError> {
    state.sessions.end()
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// The authenticated user
///
/// # Endpoint
///
/// `GET /api/v1/auth/me`
///
/// # Response
///
/// - `200 OK` - `{success, data: <user>}`
/// - `401 Unauthorized` - Missing or invalid token
async fn me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    ApiResponse::success(user)
}
