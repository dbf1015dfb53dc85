pub mod update_details;
pub mod update_password;

pub use update_details::UpdateDetailsCommand;
pub use update_password::UpdatePasswordCommand;
