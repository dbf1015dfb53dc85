pub mod create;
pub mod delete;
pub mod update;
pub mod upload_photo;

pub use create::CreateBootcampCommand;
pub use delete::{DeleteBootcampCommand, DeleteBootcampResponse};
pub use update::UpdateBootcampCommand;
pub use upload_photo::UploadPhotoCommand;
