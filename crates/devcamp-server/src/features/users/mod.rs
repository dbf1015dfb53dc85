//! User administration
//!
//! Admin-only CRUD over accounts. User documents never include the password
//! hash or the reset token.

pub mod commands;
pub mod queries;
pub mod routes;

use crate::error::AppError;
use crate::features::shared::resource::{Field, FieldKind, Resource, ResourceSchema};
use uuid::Uuid;

pub use commands::{CreateUserCommand, DeleteUserCommand, UpdateUserCommand};
pub use queries::GetUserQuery;
pub use routes::users_routes;

/// Queryable fields of `users`
pub static USERS: Resource = Resource {
    name: "user",
    table: "users",
    fields: &[
        Field::new("id", "t.id", FieldKind::Id),
        Field::new("name", "t.name", FieldKind::Text),
        Field::new("email", "t.email", FieldKind::Text),
        Field::new("role", "t.role::text", FieldKind::Text),
        Field::new("createdAt", "t.created_at", FieldKind::Timestamp),
        Field::new("updatedAt", "t.updated_at", FieldKind::Timestamp),
        Field::new(
            "bootcamps",
            "COALESCE((\
                SELECT jsonb_agg(jsonb_build_object('id', b.id, 'name', b.name, 'slug', b.slug) \
                    ORDER BY b.created_at DESC, b.id) \
                FROM bootcamps b WHERE b.user_id = t.id), '[]'::jsonb)",
            FieldKind::Document,
        ),
    ],
};

pub struct Users;

impl ResourceSchema for Users {
    const RESOURCE: &'static Resource = &USERS;
}

pub fn user_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("There are no user with id of {}", id))
}
