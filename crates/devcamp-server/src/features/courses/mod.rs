//! Courses
//!
//! Every course belongs to one bootcamp. Course writes keep the bootcamp's
//! `averageCost` current inside the same transaction.

pub mod commands;
pub mod queries;
pub mod routes;

use crate::error::AppError;
use crate::features::shared::resource::{Field, FieldKind, Resource, ResourceSchema};
use uuid::Uuid;

pub use commands::{CreateCourseCommand, DeleteCourseCommand, UpdateCourseCommand};
pub use queries::{GetCourseQuery, ListBootcampCoursesQuery};
pub use routes::{bootcamp_courses_routes, courses_routes};

/// Queryable fields of `courses`; `bootcamp` filters by id and renders a summary
pub static COURSES: Resource = Resource {
    name: "course",
    table: "courses",
    fields: &[
        Field::new("id", "t.id", FieldKind::Id),
        Field::new("title", "t.title", FieldKind::Text),
        Field::new("description", "t.description", FieldKind::Text),
        Field::new("weeks", "t.weeks", FieldKind::Number),
        Field::new("tuition", "t.tuition", FieldKind::Number),
        Field::new("minimumSkill", "t.minimum_skill::text", FieldKind::Text),
        Field::new("scholarshipAvailable", "t.scholarship_available", FieldKind::Boolean),
        Field::populated(
            "bootcamp",
            "t.bootcamp_id",
            FieldKind::Id,
            "(SELECT jsonb_build_object('id', b.id, 'name', b.name, 'description', b.description) \
              FROM bootcamps b WHERE b.id = t.bootcamp_id)",
        ),
        Field::new("user", "t.user_id", FieldKind::Id),
        Field::new("createdAt", "t.created_at", FieldKind::Timestamp),
    ],
};

/// Type-level handle for [`COURSES`]
pub struct Courses;

impl ResourceSchema for Courses {
    const RESOURCE: &'static Resource = &COURSES;
}

pub fn course_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("No course found with id of {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::projection::Projection;
    use sqlx::{Postgres, QueryBuilder};

    #[test]
    fn test_bootcamp_filters_by_foreign_key() {
        let bootcamp = COURSES.field("bootcamp").unwrap();
        assert_eq!(bootcamp.expr, "t.bootcamp_id");
        assert!(bootcamp.select_expr().contains("jsonb_build_object('id', b.id, 'name', b.name"));
    }

    #[test]
    fn test_default_document() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        COURSES.push_select(&mut qb, &Projection::All);
        let sql = qb.sql();
        assert!(sql.contains("'minimumSkill', t.minimum_skill::text"));
        assert!(sql.contains("'bootcamp', (SELECT jsonb_build_object("));
        assert!(sql.ends_with("FROM courses t"));
    }
}
