//! Shared utilities and types for feature modules
//!
//! # Contents
//!
//! - **resource**: Static field allow-lists of the queryable tables
//! - **query**: Query-string filter translation
//! - **projection**: `select` and `sort` handling
//! - **pagination**: Page window and page-count helpers
//! - **advanced_results**: The list pipeline and its extractor
//! - **ownership**: Owner-or-admin policy for writes
//! - **validation**: Input validation utilities
//! - **error_helpers**: Database constraint error mapping

pub mod advanced_results;
pub mod error_helpers;
pub mod ownership;
pub mod pagination;
pub mod projection;
pub mod query;
pub mod resource;
pub mod validation;

// Re-export commonly used types
pub use advanced_results::{advanced_results, AdvancedQuery, AdvancedResults, QueryOptions};
pub use ownership::{ensure_owner, load_owned};
pub use pagination::Pagination;
pub use query::QueryError;
pub use resource::{Field, FieldKind, Resource, ResourceSchema};
pub use validation::ValidationError;
