//! Feature modules implementing the DevCamp API
//!
//! Each feature is a vertical slice with its own commands, queries, and
//! routes.
//!
//! # Features
//!
//! - **bootcamps**: Bootcamp CRUD, photo upload and radius search
//! - **courses**: Courses, globally and nested under a bootcamp
//! - **users**: Admin user management
//! - **auth**: Registration, login, logout and password reset
//! - **account**: The requester's own details and password
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations (create, update, delete)
//! - `queries/` - Read operations (get, list)
//! - `routes.rs` - HTTP route definitions
//!
//! List endpoints share the pipeline in [`shared::advanced_results`].

pub mod account;
pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod shared;
pub mod users;

use axum::Router;
use std::sync::Arc;

use crate::auth::Sessions;
use crate::config::UploadConfig;
use crate::geocoder::Geocoder;
use crate::mailer::Mailer;
use crate::storage::Storage;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: sqlx::PgPool,
    /// S3-compatible storage for bootcamp photos
    pub storage: Storage,
    pub geocoder: Arc<dyn Geocoder>,
    pub mailer: Arc<dyn Mailer>,
    /// Token issuing and session cookies
    pub sessions: Arc<Sessions>,
    pub upload: UploadConfig,
}

/// Creates the API router with all feature routes mounted
///
/// - `/bootcamps` - Bootcamps and their nested courses
/// - `/courses` - Courses
/// - `/users` - User management (admin)
/// - `/auth` - Sessions and password reset
/// - `/account` - The requester's account
pub fn router(state: FeatureState) -> Router<()> {
    let max_upload = state.upload.max_file_size;

    Router::new()
        .nest("/bootcamps", bootcamps::bootcamps_routes(max_upload))
        .nest("/courses", courses::courses_routes())
        .nest("/users", users::users_routes())
        .nest("/auth", auth::auth_routes())
        .nest("/account", account::account_routes())
        .with_state(state)
}
