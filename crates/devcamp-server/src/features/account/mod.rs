//! The requester's own account

pub mod commands;
pub mod routes;

pub use commands::{UpdateDetailsCommand, UpdatePasswordCommand};
pub use routes::account_routes;
