//! DevCamp Server Library
//!
//! REST API for a directory of coding bootcamps, their courses and the users
//! who publish them.
//!
//! # Overview
//!
//! - **API Endpoints**: Bootcamps, courses, users, authentication and account
//! - **Database Management**: PostgreSQL integration with SQLx
//! - **Storage Backend**: S3-compatible storage for bootcamp photos
//! - **Collaborators**: Address geocoding and outgoing mail behind traits
//! - **Configuration**: Environment-based configuration management
//! - **Middleware**: CORS, request logging and authentication extractors
//!
//! # Architecture
//!
//! Features are vertical slices. Each splits into **commands** (write
//! operations behind POST, PUT and DELETE) and **queries** (read operations
//! behind GET). List endpoints go through one shared pipeline that turns the
//! query string into a filtered, projected, sorted and paginated SQL query.
//!
//! ## Framework Stack
//!
//! - **Axum**: Modern, ergonomic web framework
//! - **SQLx**: PostgreSQL driver and migrations
//! - **Tower**: Middleware and service abstractions
//!
//! # Example
//!
//! ```no_run
//! use devcamp_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod geocoder;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod storage;

// Re-export commonly used types
pub use error::{AppError, AppResult};
