//! DevCamp Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities and error handling for the DevCamp workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`CommonError`] and its result alias
//! - **Logging**: `tracing` subscriber setup shared by every binary
//! - **Digests**: SHA-256 helpers used for one-time tokens
//!
//! # Example
//!
//! ```no_run
//! use devcamp_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> devcamp_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("Application started");
//!     Ok(())
//! }
//! ```

pub mod digest;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{CommonError, Result};
