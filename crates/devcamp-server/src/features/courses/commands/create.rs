//! Create course command
//!
//! Adds a course to a bootcamp the requester owns (admins may add to any) and
//! refreshes the bootcamp's average cost.

use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::recompute_average_cost;
use crate::error::AppResult;
use crate::features::bootcamps::bootcamp_not_found;
use crate::features::courses::{course_not_found, COURSES};
use crate::features::shared::error_helpers::map_foreign_key_violation;
use crate::features::shared::ownership::{ensure_owner, load_owned};
use crate::features::shared::validation::{
    require, require_some, validate_max_len, ValidationError,
};
use crate::models::{SkillLevel, User};

pub(crate) const TITLE_REQUIRED: &str = "Course title is required";
pub(crate) const TITLE_TOO_LONG: &str = "Title can not be more than 200 characters";
pub(crate) const DESCRIPTION_REQUIRED: &str = "Course description is required";
pub(crate) const WEEKS_REQUIRED: &str = "Course number of weeks is required";
pub(crate) const TUITION_REQUIRED: &str = "Course tuition cost is required";
pub(crate) const SKILL_REQUIRED: &str = "Course minimumSkill is required";
pub(crate) const WEEKS_TOO_FEW: &str = "Course must last at least 1 week";
pub(crate) const TUITION_NEGATIVE: &str = "Course tuition can not be negative";

/// Request body of `POST /bootcamps/:id/courses`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<i32>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<SkillLevel>,
    #[serde(default)]
    pub scholarship_available: bool,
}

pub(crate) fn check_title(title: Option<&str>) -> Result<(), ValidationError> {
    validate_max_len(require(title, TITLE_REQUIRED)?, 200, TITLE_TOO_LONG)
}

pub(crate) fn check_weeks(weeks: i32) -> Result<(), ValidationError> {
    if weeks < 1 {
        return Err(ValidationError::OutOfRange(WEEKS_TOO_FEW));
    }
    Ok(())
}

pub(crate) fn check_tuition(tuition: f64) -> Result<(), ValidationError> {
    if !tuition.is_finite() || tuition < 0.0 {
        return Err(ValidationError::OutOfRange(TUITION_NEGATIVE));
    }
    Ok(())
}

impl CreateCourseCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_title(self.title.as_deref())?;
        require(self.description.as_deref(), DESCRIPTION_REQUIRED)?;
        check_weeks(require_some(self.weeks, WEEKS_REQUIRED)?)?;
        check_tuition(require_some(self.tuition, TUITION_REQUIRED)?)?;
        require_some(self.minimum_skill, SKILL_REQUIRED)?;
        Ok(())
    }
}

/// Add a course to `bootcamp_id` and return its document
///
/// # Errors
///
/// - `NotFound` when the bootcamp does not exist
/// - `Forbidden` unless `requester` owns the bootcamp or is an admin
/// - `Duplicate` when the title is taken
#[tracing::instrument(skip(pool, requester, command), fields(bootcamp_id = %bootcamp_id, user_id = %requester.id))]
pub async fn handle(
    pool: PgPool,
    requester: &User,
    bootcamp_id: Uuid,
    command: CreateCourseCommand,
) -> AppResult<Value> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    let bootcamp = load_owned(&mut *tx, "bootcamps", bootcamp_id)
        .await?
        .ok_or_else(|| bootcamp_not_found(bootcamp_id))?;
    ensure_owner(
        &bootcamp,
        requester,
        &format!("add a course to bootcamp {}", bootcamp_id),
    )?;

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO courses (bootcamp_id, user_id, title, description, weeks, tuition, minimum_skill, scholarship_available)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(bootcamp_id)
    .bind(requester.id)
    .bind(command.title.as_deref().map(str::trim))
    .bind(command.description.as_deref())
    .bind(command.weeks)
    .bind(command.tuition)
    .bind(command.minimum_skill)
    .bind(command.scholarship_available)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_foreign_key_violation(e, || bootcamp_not_found(bootcamp_id)))?;

    recompute_average_cost(&mut tx, bootcamp_id).await?;

    let course = COURSES
        .fetch_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| course_not_found(id))?;

    tx.commit().await?;

    tracing::info!(course_id = %id, "Course created");

    Ok(course)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateCourseCommand {
        CreateCourseCommand {
            title: Some("Front End Web Development".to_string()),
            description: Some("HTML, CSS and JavaScript".to_string()),
            weeks: Some(8),
            tuition: Some(8_000.0),
            minimum_skill: Some(SkillLevel::Beginner),
            scholarship_available: true,
        }
    }

    #[test]
    fn test_validation_success() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validation_required_fields_in_order() {
        let cases = [
            (CreateCourseCommand { title: None, ..valid() }, TITLE_REQUIRED),
            (CreateCourseCommand { description: Some(" ".into()), ..valid() }, DESCRIPTION_REQUIRED),
            (CreateCourseCommand { weeks: None, ..valid() }, WEEKS_REQUIRED),
            (CreateCourseCommand { tuition: None, ..valid() }, TUITION_REQUIRED),
            (CreateCourseCommand { minimum_skill: None, ..valid() }, SKILL_REQUIRED),
        ];

        for (cmd, expected) in cases {
            assert_eq!(cmd.validate().unwrap_err().to_string(), expected);
        }
    }

    #[test]
    fn test_validation_title_length() {
        let at_limit = CreateCourseCommand { title: Some("t".repeat(200)), ..valid() };
        assert!(at_limit.validate().is_ok());

        let padded = CreateCourseCommand { title: Some(format!("  {}  ", "t".repeat(200))), ..valid() };
        assert!(padded.validate().is_ok());

        let too_long = CreateCourseCommand { title: Some("t".repeat(201)), ..valid() };
        assert_eq!(too_long.validate().unwrap_err().to_string(), TITLE_TOO_LONG);
    }

    #[test]
    fn test_validation_ranges() {
        let weeks = CreateCourseCommand { weeks: Some(0), ..valid() };
        assert_eq!(weeks.validate().unwrap_err().to_string(), WEEKS_TOO_FEW);

        let tuition = CreateCourseCommand { tuition: Some(-1.0), ..valid() };
        assert_eq!(tuition.validate().unwrap_err().to_string(), TUITION_NEGATIVE);

        let free = CreateCourseCommand { tuition: Some(0.0), ..valid() };
        assert!(free.validate().is_ok());
    }

    #[test]
    fn test_deserialize_skill_level() {
        let cmd: CreateCourseCommand = serde_json::from_value(serde_json::json!({
            "title": "Data Science",
            "minimumSkill": "advanced",
            "weeks": 12
        }))
        .unwrap();
        assert_eq!(cmd.minimum_skill, Some(SkillLevel::Advanced));
        assert!(!cmd.scholarship_available);

        let unknown = serde_json::from_value::<CreateCourseCommand>(serde_json::json!({
            "minimumSkill": "expert"
        }));
        assert!(unknown.is_err());
    }
}
