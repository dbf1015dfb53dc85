pub mod forgot_password;
pub mod login;
pub mod register;
pub mod reset_password;

pub use forgot_password::ForgotPasswordCommand;
pub use login::LoginCommand;
pub use register::RegisterCommand;
pub use reset_password::ResetPasswordCommand;
