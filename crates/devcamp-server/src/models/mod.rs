//! Database models
//!
//! Typed rows used by write paths and authentication. Read paths return JSON
//! documents built by the resource projections in `features::shared`.

pub mod bootcamp;
pub mod course;
pub mod user;

use sqlx::FromRow;
use uuid::Uuid;

pub use bootcamp::{slugify, Location, CAREERS, DEFAULT_PHOTO};
pub use course::{average_cost, SkillLevel};
pub use user::{Role, User, UserRecord};

/// Identity and owner of a user-owned row
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Owned {
    pub id: Uuid,
    pub user_id: Uuid,
}
