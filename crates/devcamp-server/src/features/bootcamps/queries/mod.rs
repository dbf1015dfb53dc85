pub mod get;
pub mod within_radius;

pub use get::GetBootcampQuery;
pub use within_radius::{BootcampsWithinRadiusQuery, Coordinates};
