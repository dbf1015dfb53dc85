//! Bootcamp API routes
//!
//! # Route Structure
//!
//! - `GET /api/v1/bootcamps` - List bootcamps (filter, select, sort, paginate)
//! - `POST /api/v1/bootcamps` - Create a bootcamp (publisher, admin)
//! - `GET /api/v1/bootcamps/:id` - Get a bootcamp with its courses
//! - `PUT /api/v1/bootcamps/:id` - Update a bootcamp (owner, admin)
//! - `DELETE /api/v1/bootcamps/:id` - Delete a bootcamp and its courses (owner, admin)
//! - `PUT /api/v1/bootcamps/:id/photo` - Upload a photo (owner, admin)
//! - `GET /api/v1/bootcamps/radius/:distance` - Bootcamps within `distance` miles
//! - `GET|POST /api/v1/bootcamps/:id/courses` - See `features::courses`

use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        DefaultBodyLimit, Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde_json::json;

use super::{
    commands::{
        self, CreateBootcampCommand, DeleteBootcampCommand, UpdateBootcampCommand,
        UploadPhotoCommand,
    },
    queries::{self, BootcampsWithinRadiusQuery, Coordinates, GetBootcampQuery},
    Bootcamps,
};
use crate::api::{extract::JsonBody, response::ApiResponse};
use crate::error::{parse_id, AppError};
use crate::features::courses::bootcamp_courses_routes;
use crate::features::shared::{AdvancedQuery, AdvancedResults};
use crate::features::FeatureState;
use crate::middleware::{CurrentUser, PUBLISHER_ROLES};

/// Room for multipart framing on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the bootcamps router, including the nested course routes
///
/// `max_upload` is the largest accepted photo in bytes.
pub fn bootcamps_routes(max_upload: usize) -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_bootcamps).post(create_bootcamp))
        .route(
            "/:id",
            get(get_bootcamp).put(update_bootcamp).delete(delete_bootcamp),
        )
        .route(
            "/:id/photo",
            put(upload_photo).layer(DefaultBodyLimit::max(max_upload + MULTIPART_OVERHEAD)),
        )
        .route("/radius/:distance", get(bootcamps_within_radius))
        .merge(bootcamp_courses_routes())
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Create a bootcamp owned by the requester
///
/// # Endpoint
///
/// `POST /api/v1/bootcamps`
///
/// # Response
///
/// - `201 Created` - `{success, data: <bootcamp>}`
/// - `400 Bad Request` - Validation error, unknown address or duplicate name
/// - `403 Forbidden` - Requester is not a publisher or admin
/// - `409 Conflict` - Publisher already owns a bootcamp
async fn create_bootcamp(
    State(state): State<FeatureState>,
    user: CurrentUser,
    JsonBody(command): JsonBody<CreateBootcampCommand>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(PUBLISHER_ROLES)?;

    let bootcamp =
        commands::create::handle(state.db, state.geocoder.as_ref(), &user.0, command).await?;

    Ok((StatusCode::CREATED, ApiResponse::success(bootcamp)))
}

/// Update a bootcamp
///
/// # Endpoint
///
/// `PUT /api/v1/bootcamps/:id`
///
/// # Response
///
/// - `200 OK` - `{success, data: <bootcamp>}`
/// - `403 Forbidden` - Requester neither owns the bootcamp nor is an admin
/// - `404 Not Found` - No bootcamp with this id
async fn update_bootcamp(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
    JsonBody(command): JsonBody<UpdateBootcampCommand>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(PUBLISHER_ROLES)?;
    let id = parse_id(&raw_id)?;

    let bootcamp =
        commands::update::handle(state.db, state.geocoder.as_ref(), &user.0, id, command).await?;

    Ok(ApiResponse::success(bootcamp))
}

/// Delete a bootcamp and its courses
///
/// # Endpoint
///
/// `DELETE /api/v1/bootcamps/:id`
///
/// # Response
///
/// - `200 OK` - `{success, data: {}}`
/// - `403 Forbidden` - Requester neither owns the bootcamp nor is an admin
/// - `404 Not Found` - No bootcamp with this id
async fn delete_bootcamp(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(PUBLISHER_ROLES)?;
    let id = parse_id(&raw_id)?;

    commands::delete::handle(state.db, &user.0, DeleteBootcampCommand { id }).await?;

    Ok(ApiResponse::success(json!({})))
}

/// Upload the bootcamp photo from multipart field `file`
///
/// # Endpoint
///
/// `PUT /api/v1/bootcamps/:id/photo`
///
/// # Response
///
/// - `200 OK` - `{success, data: "photo_<id>.jpg"}`
/// - `400 Bad Request` - No file, not an image, or too large
/// - `500 Internal Server Error` - `Problem with file upload`
async fn upload_photo(
    State(state): State<FeatureState>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(PUBLISHER_ROLES)?;
    let id = parse_id(&raw_id)?;

    let multipart = multipart.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    let command = read_photo(multipart).await?;

    let file_name = commands::upload_photo::handle(
        state.db,
        &state.storage,
        &user.0,
        id,
        state.upload.max_file_size,
        command,
    )
    .await?;

    Ok(ApiResponse::success(file_name))
}

async fn read_photo(mut multipart: Multipart) -> Result<UploadPhotoCommand, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;

        return Ok(UploadPhotoCommand {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }

    Ok(UploadPhotoCommand::default())
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::validation(err.body_text())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// List bootcamps
///
/// # Endpoint
///
/// `GET /api/v1/bootcamps?careers[in]=Business&averageCost[lte]=10000&select=name&sort=-averageRating&page=2&limit=5`
///
/// # Response
///
/// - `200 OK` - `{success, currentPage, pageSize, pageCount, count, data}`
/// - `400 Bad Request` - Unknown field, operator or malformed value
async fn list_bootcamps(
    State(state): State<FeatureState>,
    query: AdvancedQuery<Bootcamps>,
) -> Result<AdvancedResults, AppError> {
    query.fetch(&state.db).await
}

/// Get one bootcamp with its courses
///
/// # Endpoint
///
/// `GET /api/v1/bootcamps/:id`
///
/// # Response
///
/// - `200 OK` - `{success, data: <bootcamp>}`
/// - `404 Not Found` - No bootcamp with this id
async fn get_bootcamp(
    State(state): State<FeatureState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&raw_id)?;
    let bootcamp = queries::get::handle(state.db, GetBootcampQuery { id }).await?;
    Ok(ApiResponse::success(bootcamp))
}

/// Bootcamps within `distance` miles of `{lat, lng}` in the JSON body
///
/// # Endpoint
///
/// `GET /api/v1/bootcamps/radius/:distance`
///
/// # Response
///
/// - `200 OK` - `{success, count, data}`
/// - `400 Bad Request` - Bad distance or coordinates
async fn bootcamps_within_radius(
    State(state): State<FeatureState>,
    Path(distance): Path<String>,
    JsonBody(coordinates): JsonBody<Coordinates>,
) -> Result<impl IntoResponse, AppError> {
    let query = BootcampsWithinRadiusQuery::parse(&distance, coordinates)?;
    let bootcamps = queries::within_radius::handle(state.db, query).await?;
    Ok(ApiResponse::list(bootcamps))
}
