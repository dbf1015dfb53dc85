//! Upload bootcamp photo command

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::features::bootcamps::bootcamp_not_found;
use crate::features::shared::ownership::{ensure_owner, load_owned};
use crate::models::User;
use crate::storage::{photo_file_name, Storage};

/// Message returned when the object store rejects the upload
pub const UPLOAD_FAILED_MESSAGE: &str = "Problem with file upload";

/// One file taken from the multipart `file` field
#[derive(Debug, Clone, Default)]
pub struct UploadPhotoCommand {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadPhotoCommand {
    /// Accept non-empty `image/*` files of at most `max_size` bytes
    pub fn validate(&self, max_size: usize) -> Result<(), AppError> {
        if self.data.is_empty() {
            return Err(AppError::validation("Please upload a file"));
        }

        let is_image = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(AppError::validation("Please upload an image file"));
        }

        if self.data.len() > max_size {
            return Err(AppError::validation(format!(
                "Please upload an image less than {} bytes",
                max_size
            )));
        }

        Ok(())
    }
}

/// Store the photo as `photo_<id><ext>` and point the bootcamp at it
///
/// Returns the stored file name.
#[tracing::instrument(
    skip(pool, storage, requester, command),
    fields(bootcamp_id = %id, size = command.data.len())
)]
pub async fn handle(
    pool: PgPool,
    storage: &Storage,
    requester: &User,
    id: Uuid,
    max_size: usize,
    command: UploadPhotoCommand,
) -> AppResult<String> {
    let owned = load_owned(&pool, "bootcamps", id)
        .await?
        .ok_or_else(|| bootcamp_not_found(id))?;
    ensure_owner(&owned, requester, "update this bootcamp")?;

    command.validate(max_size)?;

    let file_name = photo_file_name(id, command.file_name.as_deref());

    let uploaded = storage
        .upload(&file_name, command.data, command.content_type)
        .await
        .map_err(|e| AppError::upstream(UPLOAD_FAILED_MESSAGE, e))?;

    sqlx::query("UPDATE bootcamps SET photo = $1 WHERE id = $2")
        .bind(&file_name)
        .bind(id)
        .execute(&pool)
        .await?;

    tracing::info!(key = %uploaded.key, checksum = %uploaded.checksum, "Bootcamp photo uploaded");

    Ok(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(content_type: &str, size: usize) -> UploadPhotoCommand {
        UploadPhotoCommand {
            file_name: Some("camp.JPG".to_string()),
            content_type: Some(content_type.to_string()),
            data: vec![0u8; size],
        }
    }

    #[test]
    fn test_image_within_limit_is_accepted() {
        assert!(photo("image/jpeg", 1_000).validate(1_000).is_ok());
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let err = UploadPhotoCommand::default().validate(1_000).unwrap_err();
        assert_eq!(err.to_string(), "Please upload a file");
    }

    #[test]
    fn test_non_image_is_rejected() {
        let err = photo("application/pdf", 10).validate(1_000).unwrap_err();
        assert_eq!(err.to_string(), "Please upload an image file");
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        let err = photo("image/png", 1_001).validate(1_000).unwrap_err();
        assert_eq!(err.to_string(), "Please upload an image less than 1000 bytes");
    }
}
