pub mod get;
pub mod list_by_bootcamp;

pub use get::GetCourseQuery;
pub use list_by_bootcamp::ListBootcampCoursesQuery;
