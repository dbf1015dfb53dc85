//! Account routes
//!
//! - `PUT /api/v1/account/details` - Change name and email
//! - `PUT /api/v1/account/password` - Change password, starting a new session

use axum::{extract::State, response::IntoResponse, routing::put, Router};

use super::commands::{self, UpdateDetailsCommand, UpdatePasswordCommand};
use crate::api::{extract::JsonBody, response::ApiResponse};
use crate::error::AppError;
use crate::features::FeatureState;
use crate::middleware::CurrentUser;

pub fn account_routes() -> Router<FeatureState> {
    Router::new()
        .route("/details", put(update_details))
        .route("/password", put(update_password))
}

/// `200 OK` with `{success, data: <user>}`
async fn update_details(
    State(state): State<FeatureState>,
    CurrentUser(user): CurrentUser,
    JsonBody(command): JsonBody<UpdateDetailsCommand>,
) -> Result<impl IntoResponse, AppError> {
    let user = commands::update_details::handle(state.db, user.id, command).await?;
    Ok(ApiResponse::success(user))
}

/// `200 OK` with `{success, token}` plus a fresh `token` cookie;
/// `400 Password is incorrect` when the current password does not match
async fn update_password(
    State(state): State<FeatureState>,
    CurrentUser(user): CurrentUser,
    JsonBody(command): JsonBody<UpdatePasswordCommand>,
) -> Result<impl IntoResponse, AppError> {
    commands::update_password::handle(state.db, user.id, command).await?;
    state.sessions.start(user.id)
}
