//! Update bootcamp command
//!
//! Only fields present in the body change. A new address is geocoded again
//! and a new name regenerates the slug.

use serde::Deserialize;
use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::create::{
    ADDRESS_REQUIRED, CAREERS_REQUIRED, DESCRIPTION_REQUIRED, DESCRIPTION_TOO_LONG, NAME_REQUIRED,
    NAME_TOO_LONG, PHONE_TOO_LONG,
};
use crate::error::AppResult;
use crate::features::bootcamps::{bootcamp_not_found, BOOTCAMPS};
use crate::features::shared::ownership::{ensure_owner, load_owned};
use crate::features::shared::validation::{
    require, validate_careers, validate_email, validate_max_len, validate_rating, validate_url,
    ValidationError,
};
use crate::geocoder::Geocoder;
use crate::models::{slugify, Location, User};

/// Request body of `PUT /bootcamps/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBootcampCommand {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub average_rating: Option<f64>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl UpdateBootcampCommand {
    /// Check the fields that are present
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_some() {
            let name = require(self.name.as_deref(), NAME_REQUIRED)?;
            validate_max_len(name, 50, NAME_TOO_LONG)?;
        }
        if self.description.is_some() {
            let description = require(self.description.as_deref(), DESCRIPTION_REQUIRED)?;
            validate_max_len(description, 500, DESCRIPTION_TOO_LONG)?;
        }
        if let Some(website) = &self.website {
            validate_url(website, "website")?;
        }
        if let Some(phone) = &self.phone {
            validate_max_len(phone, 20, PHONE_TOO_LONG)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if self.address.is_some() {
            require(self.address.as_deref(), ADDRESS_REQUIRED)?;
        }
        if let Some(careers) = &self.careers {
            if careers.is_empty() {
                return Err(ValidationError::Required(CAREERS_REQUIRED));
            }
            validate_careers(careers)?;
        }
        if let Some(rating) = self.average_rating {
            validate_rating(rating)?;
        }
        Ok(())
    }

    /// True when the body names no updatable field
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.website.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.careers.is_none()
            && self.average_rating.is_none()
            && self.housing.is_none()
            && self.job_assistance.is_none()
            && self.job_guarantee.is_none()
            && self.accept_gi.is_none()
    }
}

/// Push `UPDATE bootcamps SET .. WHERE id = $n` for the present fields
fn build_update<'a>(
    id: Uuid,
    command: &'a UpdateBootcampCommand,
    location: Option<&'a Location>,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE bootcamps SET ");
    let mut set = qb.separated(", ");

    if let Some(name) = &command.name {
        let name = name.trim();
        set.push("name = ").push_bind_unseparated(name);
        set.push("slug = ").push_bind_unseparated(slugify(name));
    }
    if let Some(description) = &command.description {
        set.push("description = ").push_bind_unseparated(description.trim());
    }
    if let Some(website) = &command.website {
        set.push("website = ").push_bind_unseparated(website);
    }
    if let Some(phone) = &command.phone {
        set.push("phone = ").push_bind_unseparated(phone);
    }
    if let Some(email) = &command.email {
        set.push("email = ").push_bind_unseparated(email);
    }
    if let Some(location) = location {
        set.push("location_lng = ").push_bind_unseparated(location.longitude);
        set.push("location_lat = ").push_bind_unseparated(location.latitude);
        set.push("formatted_address = ")
            .push_bind_unseparated(&location.formatted_address);
        set.push("street = ").push_bind_unseparated(&location.street);
        set.push("city = ").push_bind_unseparated(&location.city);
        set.push("state = ").push_bind_unseparated(&location.state);
        set.push("zipcode = ").push_bind_unseparated(&location.zipcode);
        set.push("country = ").push_bind_unseparated(&location.country);
    }
    if let Some(careers) = &command.careers {
        set.push("careers = ").push_bind_unseparated(careers);
    }
    if let Some(rating) = command.average_rating {
        set.push("average_rating = ").push_bind_unseparated(rating);
    }
    if let Some(housing) = command.housing {
        set.push("housing = ").push_bind_unseparated(housing);
    }
    if let Some(job_assistance) = command.job_assistance {
        set.push("job_assistance = ").push_bind_unseparated(job_assistance);
    }
    if let Some(job_guarantee) = command.job_guarantee {
        set.push("job_guarantee = ").push_bind_unseparated(job_guarantee);
    }
    if let Some(accept_gi) = command.accept_gi {
        set.push("accept_gi = ").push_bind_unseparated(accept_gi);
    }

    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb
}

async fn check_owner<'e, E>(executor: E, requester: &User, id: Uuid) -> AppResult<()>
where
    E: Executor<'e, Database = Postgres>,
{
    let owned = load_owned(executor, "bootcamps", id)
        .await?
        .ok_or_else(|| bootcamp_not_found(id))?;
    ensure_owner(&owned, requester, "update this bootcamp")
}

/// Apply `command` to bootcamp `id` and return the updated document
///
/// # Errors
///
/// - `NotFound` when no bootcamp has this id
/// - `Forbidden` unless `requester` owns it or is an admin
/// - `Validation` for a bad field or an address that does not geocode
#[tracing::instrument(skip(pool, geocoder, requester, command), fields(bootcamp_id = %id, user_id = %requester.id))]
pub async fn handle(
    pool: PgPool,
    geocoder: &dyn Geocoder,
    requester: &User,
    id: Uuid,
    command: UpdateBootcampCommand,
) -> AppResult<Value> {
    command.validate()?;

    // Geocoding stays outside the transaction, behind an ownership check
    let location = match command.address.as_deref() {
        Some(address) => {
            check_owner(&pool, requester, id).await?;
            Some(geocoder.geocode(address.trim()).await?)
        },
        None => None,
    };

    let mut tx = pool.begin().await?;

    check_owner(&mut *tx, requester, id).await?;

    if !command.is_empty() {
        build_update(id, &command, location.as_ref())
            .build()
            .execute(&mut *tx)
            .await?;
    }

    let document = BOOTCAMPS
        .fetch_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| bootcamp_not_found(id))?;

    tx.commit().await?;

    tracing::info!("Bootcamp updated");

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_is_valid() {
        let cmd = UpdateBootcampCommand::default();
        assert!(cmd.validate().is_ok());
        assert!(cmd.is_empty());
    }

    #[test]
    fn test_present_fields_are_validated() {
        let blank = UpdateBootcampCommand {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.validate().unwrap_err().to_string(), NAME_REQUIRED);

        let no_careers = UpdateBootcampCommand {
            careers: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(no_careers.validate().unwrap_err().to_string(), CAREERS_REQUIRED);

        let bad_email = UpdateBootcampCommand {
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert_eq!(bad_email.validate().unwrap_err().to_string(), "Please add a valid email");
    }

    #[test]
    fn test_build_update_renames_and_reslugs() {
        let id = Uuid::new_v4();
        let cmd = UpdateBootcampCommand {
            name: Some("New Name".to_string()),
            housing: Some(true),
            ..Default::default()
        };
        let qb = build_update(id, &cmd, None);
        assert_eq!(
            qb.sql(),
            "UPDATE bootcamps SET name = $1, slug = $2, housing = $3 WHERE id = $4"
        );
    }

    #[test]
    fn test_build_update_writes_every_location_part() {
        let location = Location {
            longitude: -71.1,
            latitude: 42.3,
            city: Some("Boston".to_string()),
            ..Default::default()
        };
        let cmd = UpdateBootcampCommand {
            address: Some("Boston".to_string()),
            ..Default::default()
        };
        let qb = build_update(Uuid::new_v4(), &cmd, Some(&location));
        let sql = qb.sql();
        assert!(sql.starts_with("UPDATE bootcamps SET location_lng = $1, location_lat = $2"));
        assert!(sql.contains("country = $8"));
        assert!(sql.ends_with("WHERE id = $9"));
        assert!(!sql.contains("address"));
    }
}
