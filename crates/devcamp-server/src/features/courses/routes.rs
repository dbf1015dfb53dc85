//! Course API routes
//!
//! # Route Structure
//!
//! - `GET /api/v1/courses` - List courses (filter, select, sort, paginate)
//! - `GET /api/v1/courses/:id` - Get a course with its bootcamp summary
//! - `PUT /api/v1/courses/:id` - Update a course (owner, admin)
//! - `DELETE /api/v1/courses/:id` - Delete a course (owner, admin)
//! - `GET /api/v1/bootcamps/:id/courses` - All courses of one bootcamp
//! - `POST /api/v1/bootcamps/:id/courses` - Add a course (bootcamp owner, admin)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;

use super::{
    commands::{self, CreateCourseCommand, DeleteCourseCommand, UpdateCourseCommand},
    queries::{self, GetCourseQuery, ListBootcampCoursesQuery},
    Courses,
};
use crate::api::{extract::JsonBody, response::ApiResponse};
use crate::error::{parse_id, AppError};
use crate::features::shared::{AdvancedQuery, AdvancedResults};
use crate::features::FeatureState;
use crate::middleware::{CurrentUser, PUBLISHER_ROLES};

// ============================================================================
// Router Configuration
// ============================================================================

/// Routes mounted at `/courses`
pub fn courses_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_courses))
        .route(
            "/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
}

/// Routes merged into the bootcamps router
pub fn bootcamp_courses_routes() -> Router<FeatureState> {
    Router::new().route(
        "/:id/courses",
        get(list_bootcamp_courses).post(create_course),
    )
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Add a course to a bootcamp
///
/// # Endpoint
///
/// `POST /api/v1/bootcamps/:id/courses`
///
/// # Response
///
/// - `201 Created` - `{success, data: <course>}`
/// - `400 Bad Request` - Validation error or duplicate title
/// - `403 Forbidden` - Requester neither owns the bootcamp nor is an admin
/// - `404 Not Found` - No bootcamp with this id
async fn create_course(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
    JsonBody(command): JsonBody<CreateCourseCommand>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(PUBLISHER_ROLES)?;
    let bootcamp_id = parse_id(&raw_id)?;

    let course = commands::create::handle(state.db, &user.0, bootcamp_id, command).await?;

    Ok((StatusCode::CREATED, ApiResponse::success(course)))
}

/// Update a course
///
/// # Endpoint
///
/// `PUT /api/v1/courses/:id`
///
/// # Response
///
/// - `200 OK` - `{success, data: <course>}`
/// - `403 Forbidden` - Requester neither owns the course nor is an admin
/// - `404 Not Found` - No course with this id
async fn update_course(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
    JsonBody(command): JsonBody<UpdateCourseCommand>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(PUBLISHER_ROLES)?;
    let id = parse_id(&raw_id)?;

    let course = commands::update::handle(state.db, &user.0, id, command).await?;

    Ok(ApiResponse::success(course))
}

/// Delete a course
///
/// # Endpoint
///
/// `DELETE /api/v1/courses/:id`
///
/// # Response
///
/// - `200 OK` - `{success, data: {}}`
/// - `403 Forbidden` - Requester neither owns the course nor is an admin
/// - `404 Not Found` - No course with this id
async fn delete_course(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(PUBLISHER_ROLES)?;
    let id = parse_id(&raw_id)?;

    commands::delete::handle(state.db, &user.0, DeleteCourseCommand { id }).await?;

    Ok(ApiResponse::success(json!({})))
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// List courses with their bootcamp summaries
///
/// # Endpoint
///
/// `GET /api/v1/courses?minimumSkill=beginner&tuition[lt]=10000&sort=tuition`
///
/// # Response
///
/// - `200 OK` - `{success, currentPage, pageSize, pageCount, count, data}`
/// - `400 Bad Request` - Unknown field, operator or malformed value
async fn list_courses(
    State(state): State<FeatureState>,
    query: AdvancedQuery<Courses>,
) -> Result<AdvancedResults, AppError> {
    query.fetch(&state.db).await
}

/// List every course of one bootcamp
///
/// # Endpoint
///
/// `GET /api/v1/bootcamps/:id/courses`
///
/// # Response
///
/// - `200 OK` - `{success, count, data}`
/// - `404 Not Found` - No bootcamp with this id
async fn list_bootcamp_courses(
    State(state): State<FeatureState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bootcamp_id = parse_id(&raw_id)?;

    let courses =
        queries::list_by_bootcamp::handle(state.db, ListBootcampCoursesQuery { bootcamp_id })
            .await?;

    Ok(ApiResponse::list(courses))
}

/// Get one course
///
/// # Endpoint
///
/// `GET /api/v1/courses/:id`
///
/// # Response
///
/// - `200 OK` - `{success, data: <course>}`
/// - `404 Not Found` - No course with this id
async fn get_course(
    State(state): State<FeatureState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&raw_id)?;
    let course = queries::get::handle(state.db, GetCourseQuery { id }).await?;
    Ok(ApiResponse::success(course))
}
