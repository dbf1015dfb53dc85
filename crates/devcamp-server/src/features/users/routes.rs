//! User administration routes; every endpoint requires an admin
//!
//! # Route Structure
//!
//! - `GET /api/v1/users` - List users (filter, select, sort, paginate)
//! - `POST /api/v1/users` - Create a user
//! - `GET /api/v1/users/:id` - Get a user
//! - `PUT /api/v1/users/:id` - Update a user
//! - `DELETE /api/v1/users/:id` - Delete a user

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;

use super::{
    commands::{self, CreateUserCommand, DeleteUserCommand, UpdateUserCommand},
    queries::{self, GetUserQuery},
    Users,
};
use crate::api::{extract::JsonBody, response::ApiResponse};
use crate::error::{parse_id, AppError};
use crate::features::shared::{AdvancedQuery, AdvancedResults};
use crate::features::FeatureState;
use crate::middleware::AdminUser;

pub fn users_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// `POST /api/v1/users` - `201 Created` with `{success, data: <user>}`
async fn create_user(
    State(state): State<FeatureState>,
    AdminUser(admin): AdminUser,
    JsonBody(command): JsonBody<CreateUserCommand>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(admin_id = %admin.id, "Admin creating user");
    let user = commands::create::handle(state.db, command).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(user)))
}

/// `PUT /api/v1/users/:id` - `200 OK` with `{success, data: <user>}`
async fn update_user(
    State(state): State<FeatureState>,
    AdminUser(_admin): AdminUser,
    Path(raw_id): Path<String>,
    JsonBody(command): JsonBody<UpdateUserCommand>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&raw_id)?;
    let user = commands::update::handle(state.db, id, command).await?;
    Ok(ApiResponse::success(user))
}

/// `DELETE /api/v1/users/:id` - `200 OK` with `{success, data: {}}`
async fn delete_user(
    State(state): State<FeatureState>,
    AdminUser(_admin): AdminUser,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&raw_id)?;
    commands::delete::handle(state.db, DeleteUserCommand { id }).await?;
    Ok(ApiResponse::success(json!({})))
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// `GET /api/v1/users` - advanced-results envelope
async fn list_users(
    State(state): State<FeatureState>,
    AdminUser(_admin): AdminUser,
    query: AdvancedQuery<Users>,
) -> Result<AdvancedResults, AppError> {
    query.fetch(&state.db).await
}

/// `GET /api/v1/users/:id` - `200 OK` with `{success, data: <user>}`
async fn get_user(
    State(state): State<FeatureState>,
    AdminUser(_admin): AdminUser,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&raw_id)?;
    let user = queries::get::handle(state.db, GetUserQuery { id }).await?;
    Ok(ApiResponse::success(user))
}
