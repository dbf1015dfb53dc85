use serde::Deserialize;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::create::{check_title, check_tuition, check_weeks, DESCRIPTION_REQUIRED};
use super::{lock_parent_bootcamp, recompute_average_cost};
use crate::error::AppResult;
use crate::features::courses::{course_not_found, COURSES};
use crate::features::shared::ownership::{ensure_owner, load_owned};
use crate::features::shared::validation::{require, ValidationError};
use crate::models::{SkillLevel, User};

/// Request body of `PUT /courses/:id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<i32>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<SkillLevel>,
    pub scholarship_available: Option<bool>,
}

impl UpdateCourseCommand {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_some() {
            check_title(self.title.as_deref())?;
        }
        if self.description.is_some() {
            require(self.description.as_deref(), DESCRIPTION_REQUIRED)?;
        }
        if let Some(weeks) = self.weeks {
            check_weeks(weeks)?;
        }
        if let Some(tuition) = self.tuition {
            check_tuition(tuition)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.weeks.is_none()
            && self.tuition.is_none()
            && self.minimum_skill.is_none()
            && self.scholarship_available.is_none()
    }
}

/// `UPDATE courses SET .. WHERE id = $n RETURNING bootcamp_id`
fn build_update(id: Uuid, command: &UpdateCourseCommand) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE courses SET ");
    let mut set = qb.separated(", ");

    if let Some(title) = &command.title {
        set.push("title = ").push_bind_unseparated(title.trim());
    }
    if let Some(description) = &command.description {
        set.push("description = ").push_bind_unseparated(description);
    }
    if let Some(weeks) = command.weeks {
        set.push("weeks = ").push_bind_unseparated(weeks);
    }
    if let Some(tuition) = command.tuition {
        set.push("tuition = ").push_bind_unseparated(tuition);
    }
    if let Some(skill) = command.minimum_skill {
        set.push("minimum_skill = ").push_bind_unseparated(skill);
    }
    if let Some(scholarship) = command.scholarship_available {
        set.push("scholarship_available = ").push_bind_unseparated(scholarship);
    }

    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING bootcamp_id");
    qb
}

/// Apply `command` to course `id`, refresh the bootcamp's average cost and
/// return the course document
#[tracing::instrument(skip(pool, requester, command), fields(course_id = %id, user_id = %requester.id))]
pub async fn handle(
    pool: PgPool,
    requester: &User,
    id: Uuid,
    command: UpdateCourseCommand,
) -> AppResult<Value> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    lock_parent_bootcamp(&mut tx, id)
        .await?
        .ok_or_else(|| course_not_found(id))?;

    let owned = load_owned(&mut *tx, "courses", id)
        .await?
        .ok_or_else(|| course_not_found(id))?;
    ensure_owner(&owned, requester, "update this course")?;

    if !command.is_empty() {
        let bootcamp_id: Uuid = build_update(id, &command)
            .build_query_scalar()
            .fetch_one(&mut *tx)
            .await?;

        recompute_average_cost(&mut tx, bootcamp_id).await?;
    }

    let course = COURSES
        .fetch_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| course_not_found(id))?;

    tx.commit().await?;

    tracing::info!("Course updated");

    Ok(course)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_validation() {
        assert!(UpdateCourseCommand::default().validate().is_ok());

        let cmd = UpdateCourseCommand {
            tuition: Some(-5.0),
            ..Default::default()
        };
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_title_length_is_checked() {
        let cmd = UpdateCourseCommand {
            title: Some("t".repeat(201)),
            ..Default::default()
        };
        assert_eq!(
            cmd.validate().unwrap_err().to_string(),
            super::super::create::TITLE_TOO_LONG
        );
    }

    #[test]
    fn test_build_update_returns_parent() {
        let cmd = UpdateCourseCommand {
            tuition: Some(9_000.0),
            minimum_skill: Some(SkillLevel::Intermediate),
            ..Default::default()
        };
        let qb = build_update(Uuid::new_v4(), &cmd);
        assert_eq!(
            qb.sql(),
            "UPDATE courses SET tuition = $1, minimum_skill = $2 WHERE id = $3 RETURNING bootcamp_id"
        );
    }
}
