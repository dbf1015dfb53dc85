//! Create bootcamp command
//!
//! The submitted address is geocoded and discarded; only the structured
//! location is stored. The slug is derived from the name. A publisher may own
//! one bootcamp, admins any number.

use serde::Deserialize;
use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::features::bootcamps::{bootcamp_not_found, BOOTCAMPS};
use crate::features::shared::validation::{
    require, require_some, validate_careers, validate_email, validate_max_len, validate_rating,
    validate_url, ValidationError,
};
use crate::geocoder::Geocoder;
use crate::models::{slugify, User};

pub(crate) const NAME_REQUIRED: &str = "Bootcamp name is required";
pub(crate) const NAME_TOO_LONG: &str = "Name can not be more than 50 characters";
pub(crate) const DESCRIPTION_REQUIRED: &str = "Bootcamp description is required";
pub(crate) const DESCRIPTION_TOO_LONG: &str = "Description can not be more than 500 characters";
pub(crate) const PHONE_TOO_LONG: &str = "Phone number can not be longer than 20 characters";
pub(crate) const ADDRESS_REQUIRED: &str = "Bootcamp address is required";
pub(crate) const CAREERS_REQUIRED: &str = "Bootcamp careers are required";

/// Request body of `POST /bootcamps`
///
/// # Examples
///
/// ```rust,ignore
/// let command = CreateBootcampCommand {
///     name: Some("Devworks Bootcamp".to_string()),
///     description: Some("Full stack web development".to_string()),
///     address: Some("233 Bay State Rd Boston MA 02215".to_string()),
///     careers: Some(vec!["Web Development".to_string()]),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBootcampCommand {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
}

impl CreateBootcampCommand {
    /// Check every field, stopping at the first failure
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name = require(self.name.as_deref(), NAME_REQUIRED)?;
        validate_max_len(name, 50, NAME_TOO_LONG)?;

        let description = require(self.description.as_deref(), DESCRIPTION_REQUIRED)?;
        validate_max_len(description, 500, DESCRIPTION_TOO_LONG)?;

        if let Some(website) = &self.website {
            validate_url(website, "website")?;
        }
        if let Some(phone) = &self.phone {
            validate_max_len(phone, 20, PHONE_TOO_LONG)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }

        require(self.address.as_deref(), ADDRESS_REQUIRED)?;
        validate_careers(require_some(self.careers.as_deref(), CAREERS_REQUIRED)?)?;

        if let Some(rating) = self.average_rating {
            validate_rating(rating)?;
        }

        Ok(())
    }
}

/// Fail with 409 when `owner_id` already owns a bootcamp
async fn ensure_first_bootcamp<'e, E>(executor: E, owner_id: Uuid) -> AppResult<()>
where
    E: Executor<'e, Database = Postgres>,
{
    let published: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM bootcamps WHERE user_id = $1 LIMIT 1")
            .bind(owner_id)
            .fetch_optional(executor)
            .await?;

    if published.is_some() {
        return Err(AppError::Conflict(format!(
            "The user with ID {} has already published a bootcamp",
            owner_id
        )));
    }

    Ok(())
}

/// Create a bootcamp owned by `owner` and return its full document
///
/// # Errors
///
/// - `Validation` for a bad field or an address that does not geocode
/// - `Conflict` when a non-admin already owns a bootcamp
/// - `Duplicate` when the name is taken
#[tracing::instrument(skip(pool, geocoder, owner, command), fields(user_id = %owner.id))]
pub async fn handle(
    pool: PgPool,
    geocoder: &dyn Geocoder,
    owner: &User,
    command: CreateBootcampCommand,
) -> AppResult<Value> {
    command.validate()?;

    if !owner.is_admin() {
        ensure_first_bootcamp(&pool, owner.id).await?;
    }

    let address = require(command.address.as_deref(), ADDRESS_REQUIRED)?;
    let location = geocoder.geocode(address).await?;

    let mut tx = pool.begin().await?;

    if !owner.is_admin() {
        // Serializes creates by the same publisher until commit
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(owner.id)
            .execute(&mut *tx)
            .await?;
        ensure_first_bootcamp(&mut *tx, owner.id).await?;
    }

    let name = command.name.as_deref().map(str::trim).unwrap_or_default();

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO bootcamps (
            user_id, name, slug, description, website, phone, email,
            location_lng, location_lat, formatted_address, street, city, state, zipcode, country,
            careers, average_rating, housing, job_assistance, job_guarantee, accept_gi
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
        RETURNING id
        "#,
    )
    .bind(owner.id)
    .bind(name)
    .bind(slugify(name))
    .bind(command.description.as_deref().unwrap_or_default())
    .bind(&command.website)
    .bind(&command.phone)
    .bind(&command.email)
    .bind(location.longitude)
    .bind(location.latitude)
    .bind(&location.formatted_address)
    .bind(&location.street)
    .bind(&location.city)
    .bind(&location.state)
    .bind(&location.zipcode)
    .bind(&location.country)
    .bind(command.careers.as_deref().unwrap_or_default())
    .bind(command.average_rating)
    .bind(command.housing)
    .bind(command.job_assistance)
    .bind(command.job_guarantee)
    .bind(command.accept_gi)
    .fetch_one(&mut *tx)
    .await?;

    let document = BOOTCAMPS
        .fetch_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| bootcamp_not_found(id))?;

    tx.commit().await?;

    tracing::info!(bootcamp_id = %id, name = %name, "Bootcamp created");

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateBootcampCommand {
        CreateBootcampCommand {
            name: Some("Devworks Bootcamp".to_string()),
            description: Some("Full stack web development".to_string()),
            website: Some("https://devworks.com".to_string()),
            phone: Some("(111) 111-1111".to_string()),
            email: Some("enroll@devworks.com".to_string()),
            address: Some("233 Bay State Rd Boston MA 02215".to_string()),
            careers: Some(vec!["Web Development".to_string(), "UI/UX".to_string()]),
            ..Default::default()
        }
    }

    fn message(command: &CreateBootcampCommand) -> String {
        command.validate().unwrap_err().to_string()
    }

    #[test]
    fn test_validation_success() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validation_requires_name() {
        let cmd = CreateBootcampCommand {
            name: Some("   ".to_string()),
            ..valid()
        };
        assert_eq!(message(&cmd), NAME_REQUIRED);
    }

    #[test]
    fn test_validation_name_too_long() {
        let cmd = CreateBootcampCommand {
            name: Some("a".repeat(51)),
            ..valid()
        };
        assert_eq!(message(&cmd), NAME_TOO_LONG);
    }

    #[test]
    fn test_validation_description_too_long() {
        let cmd = CreateBootcampCommand {
            description: Some("a".repeat(501)),
            ..valid()
        };
        assert_eq!(message(&cmd), DESCRIPTION_TOO_LONG);
    }

    #[test]
    fn test_validation_phone_too_long() {
        let cmd = CreateBootcampCommand {
            phone: Some("1".repeat(21)),
            ..valid()
        };
        assert_eq!(message(&cmd), PHONE_TOO_LONG);
    }

    #[test]
    fn test_validation_invalid_website() {
        let cmd = CreateBootcampCommand {
            website: Some("devworks".to_string()),
            ..valid()
        };
        assert_eq!(message(&cmd), "Please use a valid URL for website");
    }

    #[test]
    fn test_validation_requires_address() {
        let cmd = CreateBootcampCommand {
            address: None,
            ..valid()
        };
        assert_eq!(message(&cmd), ADDRESS_REQUIRED);
    }

    #[test]
    fn test_validation_requires_known_careers() {
        let missing = CreateBootcampCommand {
            careers: None,
            ..valid()
        };
        assert_eq!(message(&missing), CAREERS_REQUIRED);

        let unknown = CreateBootcampCommand {
            careers: Some(vec!["Cooking".to_string()]),
            ..valid()
        };
        assert_eq!(message(&unknown), "`Cooking` is not a valid career");
    }

    #[test]
    fn test_validation_rating_range() {
        let cmd = CreateBootcampCommand {
            average_rating: Some(11.0),
            ..valid()
        };
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let cmd: CreateBootcampCommand = serde_json::from_value(serde_json::json!({
            "name": "ModernTech",
            "jobAssistance": true,
            "averageRating": 8
        }))
        .unwrap();
        assert!(cmd.job_assistance);
        assert!(!cmd.housing);
        assert_eq!(cmd.average_rating, Some(8.0));
    }
}
