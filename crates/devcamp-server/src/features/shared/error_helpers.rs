//! Database error handling utilities
//!
//! `From<sqlx::Error> for AppError` already covers unique violations and
//! missing rows. These helpers cover the constraint failures a handler wants
//! to report in its own words, such as a course pointing at a bootcamp that
//! was deleted between the existence check and the insert.
//!
//! # Examples
//!
//! ```rust,ignore
//! use devcamp_server::features::shared::error_helpers::map_foreign_key_violation;
//!
//! sqlx::query("INSERT INTO courses ...")
//!     .execute(&mut *tx)
//!     .await
//!     .map_err(|e| map_foreign_key_violation(e, || missing_bootcamp(bootcamp_id)))?;
//! ```

use sqlx::Error as SqlxError;

use crate::error::AppError;

/// Check if the error is a foreign key violation
pub fn is_foreign_key_violation(error: &SqlxError) -> bool {
    if let SqlxError::Database(db_err) = error {
        return db_err.is_foreign_key_violation();
    }
    false
}

/// Map a foreign key violation to the error built by `missing`
///
/// Every other error goes through the default conversion.
pub fn map_foreign_key_violation<F>(error: SqlxError, missing: F) -> AppError
where
    F: FnOnce() -> AppError,
{
    if is_foreign_key_violation(&error) {
        missing()
    } else {
        AppError::from(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Constraint violations need a live database; see tests/db_tests.rs.

    #[test]
    fn test_other_errors_use_default_mapping() {
        assert!(!is_foreign_key_violation(&SqlxError::RowNotFound));

        let err = map_foreign_key_violation(SqlxError::RowNotFound, || {
            AppError::not_found("No bootcamp found")
        });
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Resource not found"));

        let err = map_foreign_key_violation(SqlxError::PoolTimedOut, || {
            AppError::not_found("No bootcamp found")
        });
        assert!(matches!(err, AppError::Database(_)));
    }
}
