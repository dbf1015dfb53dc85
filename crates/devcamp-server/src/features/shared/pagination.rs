//! Shared pagination utilities
//!
//! `page` is 1-indexed and `limit` is the page size. Both arrive as raw
//! query-string text and are validated here, so the SQL layer only ever sees
//! numeric `LIMIT`/`OFFSET` binds.
//!
//! # Examples
//!
//! ```rust,ignore
//! use devcamp_server::features::shared::pagination::{page_count, Pagination};
//!
//! let pagination = Pagination::parse(Some("3"), Some("25"))?;
//! assert_eq!(pagination.offset(), 50);
//! assert_eq!(page_count(120, pagination.limit), 5);
//! ```

use super::query::QueryError;

/// Page used when the request names none
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the request names none
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest accepted page size
pub const MAX_LIMIT: i64 = 100;

/// A validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: i64,
    /// Items per page
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Parse raw `page` and `limit` values
    ///
    /// # Errors
    ///
    /// - `InvalidPage` unless `page` is a whole number ≥ 1
    /// - `InvalidLimit` unless `limit` is a whole number in 1..=100
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, QueryError> {
        let page = match page {
            None => DEFAULT_PAGE,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or(QueryError::InvalidPage)?,
        };

        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|l| (1..=MAX_LIMIT).contains(l))
                .ok_or(QueryError::InvalidLimit { max: MAX_LIMIT })?,
        };

        Ok(Self { page, limit })
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Number of pages reported for `total` rows
///
/// Zero while the rows fit in less than one full page, otherwise
/// `ceil(total / limit)`.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total < limit {
        0
    } else {
        (total + limit - 1) / limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pagination_defaults() {
        let pagination = Pagination::parse(None, None).unwrap();
        assert_eq!(pagination, Pagination::default());
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.limit, 10);
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn test_pagination_custom() {
        let pagination = Pagination::parse(Some("3"), Some("50")).unwrap();
        assert_eq!(pagination.page, 3);
        assert_eq!(pagination.limit, 50);
        assert_eq!(pagination.offset(), 100);
    }

    #[test]
    fn test_pagination_validation() {
        assert_eq!(Pagination::parse(Some("0"), None), Err(QueryError::InvalidPage));
        assert_eq!(Pagination::parse(Some("-2"), None), Err(QueryError::InvalidPage));
        assert_eq!(Pagination::parse(Some("two"), None), Err(QueryError::InvalidPage));
        assert_eq!(Pagination::parse(Some("1.5"), None), Err(QueryError::InvalidPage));
        assert_eq!(
            Pagination::parse(None, Some("101")),
            Err(QueryError::InvalidLimit { max: 100 })
        );
        assert_eq!(
            Pagination::parse(None, Some("0")),
            Err(QueryError::InvalidLimit { max: 100 })
        );
        assert!(Pagination::parse(None, Some("100")).is_ok());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(9, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(5, 2), 3);
        assert_eq!(page_count(25, 10), 3);
    }

    #[test]
    fn test_out_of_range_page_is_accepted() {
        let pagination = Pagination::parse(Some("999"), Some("10")).unwrap();
        assert_eq!(pagination.offset(), 9_980);
    }

    proptest! {
        #[test]
        fn page_count_matches_ceiling(total in 0i64..100_000, limit in 1i64..=100) {
            let expected = if total < limit {
                0
            } else {
                (total as f64 / limit as f64).ceil() as i64
            };
            prop_assert_eq!(page_count(total, limit), expected);
        }

        #[test]
        fn offset_is_previous_pages(page in 1i64..10_000, limit in 1i64..=100) {
            let pagination = Pagination::parse(Some(&page.to_string()), Some(&limit.to_string())).unwrap();
            prop_assert_eq!(pagination.offset(), (page - 1) * limit);
        }
    }
}
