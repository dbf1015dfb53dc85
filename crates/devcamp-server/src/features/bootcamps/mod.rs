//! Bootcamps
//!
//! A bootcamp is owned by one publisher, located by a geocoded address and
//! lists its courses on read.

pub mod commands;
pub mod queries;
pub mod routes;

use crate::error::AppError;
use crate::features::shared::resource::{Field, FieldKind, Resource, ResourceSchema};
use uuid::Uuid;

pub use commands::{
    CreateBootcampCommand, DeleteBootcampCommand, UpdateBootcampCommand, UploadPhotoCommand,
};
pub use queries::{BootcampsWithinRadiusQuery, GetBootcampQuery};
pub use routes::bootcamps_routes;

/// Queryable fields of `bootcamps`
pub static BOOTCAMPS: Resource = Resource {
    name: "bootcamp",
    table: "bootcamps",
    fields: &[
        Field::new("id", "t.id", FieldKind::Id),
        Field::new("name", "t.name", FieldKind::Text),
        Field::new("slug", "t.slug", FieldKind::Text),
        Field::new("description", "t.description", FieldKind::Text),
        Field::new("website", "t.website", FieldKind::Text),
        Field::new("phone", "t.phone", FieldKind::Text),
        Field::new("email", "t.email", FieldKind::Text),
        Field::new(
            "location",
            "jsonb_build_object(\
                'type', 'Point', \
                'coordinates', jsonb_build_array(t.location_lng, t.location_lat), \
                'formattedAddress', t.formatted_address, \
                'street', t.street, \
                'city', t.city, \
                'state', t.state, \
                'zipcode', t.zipcode, \
                'country', t.country)",
            FieldKind::Document,
        ),
        Field::filter_only("location.city", "t.city", FieldKind::Text),
        Field::filter_only("location.state", "t.state", FieldKind::Text),
        Field::filter_only("location.zipcode", "t.zipcode", FieldKind::Text),
        Field::filter_only("location.country", "t.country", FieldKind::Text),
        Field::new("careers", "t.careers", FieldKind::TextList),
        Field::new("averageRating", "t.average_rating", FieldKind::Number),
        Field::new("averageCost", "t.average_cost", FieldKind::Number),
        Field::new("photo", "t.photo", FieldKind::Text),
        Field::new("housing", "t.housing", FieldKind::Boolean),
        Field::new("jobAssistance", "t.job_assistance", FieldKind::Boolean),
        Field::new("jobGuarantee", "t.job_guarantee", FieldKind::Boolean),
        Field::new("acceptGi", "t.accept_gi", FieldKind::Boolean),
        Field::new("user", "t.user_id", FieldKind::Id),
        Field::new("createdAt", "t.created_at", FieldKind::Timestamp),
        Field::new(
            "courses",
            "COALESCE((\
                SELECT jsonb_agg(jsonb_build_object(\
                    'id', c.id, \
                    'title', c.title, \
                    'description', c.description, \
                    'weeks', c.weeks, \
                    'tuition', c.tuition, \
                    'minimumSkill', c.minimum_skill::text, \
                    'scholarshipAvailable', c.scholarship_available, \
                    'bootcamp', c.bootcamp_id, \
                    'user', c.user_id, \
                    'createdAt', c.created_at) \
                    ORDER BY c.created_at DESC, c.id) \
                FROM courses c WHERE c.bootcamp_id = t.id), '[]'::jsonb)",
            FieldKind::Document,
        ),
    ],
};

/// Type-level handle for [`BOOTCAMPS`]
pub struct Bootcamps;

impl ResourceSchema for Bootcamps {
    const RESOURCE: &'static Resource = &BOOTCAMPS;
}

/// 404 for a bootcamp id that does not resolve
pub fn bootcamp_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("No bootcamp found with id of {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::projection::Projection;
    use sqlx::{Postgres, QueryBuilder};

    #[test]
    fn test_location_parts_filter_on_columns() {
        assert_eq!(BOOTCAMPS.field("location.state").map(|f| f.expr), Some("t.state"));
        assert!(!BOOTCAMPS.field("location.state").unwrap().projected);
        assert_eq!(BOOTCAMPS.field("location").unwrap().kind, FieldKind::Document);
    }

    #[test]
    fn test_default_document_lists_courses() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        BOOTCAMPS.push_select(&mut qb, &Projection::All);
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT jsonb_build_object('id', t.id, 'name', t.name"));
        assert!(sql.contains("'courses', COALESCE((SELECT jsonb_agg"));
        assert!(sql.ends_with("FROM bootcamps t"));
        assert!(!sql.contains("password"));
    }

    #[test]
    fn test_field_names_are_unique() {
        let mut names: Vec<_> = BOOTCAMPS.fields.iter().map(|f| f.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BOOTCAMPS.fields.len());
    }
}
