//! Advanced results: filtered, sorted, paginated and projected listings
//!
//! The pipeline has two halves:
//!
//! 1. [`AdvancedQuery`] extracts the raw query string of a list request and
//!    turns it into [`QueryOptions`] against a resource's allow-list. A bad
//!    parameter rejects the request with a 400 before the handler runs.
//! 2. [`advanced_results`] runs the filtered count and the page fetch and
//!    returns the [`AdvancedResults`] envelope, which list handlers return
//!    unchanged.
//!
//! # Examples
//!
//! ```rust,ignore
//! async fn list_bootcamps(
//!     State(state): State<FeatureState>,
//!     query: AdvancedQuery<Bootcamps>,
//! ) -> Result<AdvancedResults, AppError> {
//!     query.fetch(&state.db).await
//! }
//! ```

use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::marker::PhantomData;

use super::pagination::{page_count, Pagination};
use super::projection::{Projection, SortKey};
use super::query::{push_filters, Filter, QueryError};
use super::resource::{Resource, ResourceSchema};
use crate::error::AppError;

/// Everything a list request asked for
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub filters: Vec<Filter>,
    pub projection: Projection,
    pub sort: Vec<SortKey>,
    pub pagination: Pagination,
}

impl QueryOptions {
    /// Read query pairs against `resource`
    ///
    /// `select`, `sort`, `page` and `limit` are reserved; every other key is a
    /// filter. A repeated reserved key keeps its last value.
    pub fn parse(
        resource: &'static Resource,
        pairs: &[(String, String)],
    ) -> Result<Self, QueryError> {
        let mut select = None;
        let mut sort = None;
        let mut page = None;
        let mut limit = None;
        let mut filters = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "select" => select = Some(value.as_str()),
                "sort" => sort = Some(value.as_str()),
                "page" => page = Some(value.as_str()),
                "limit" => limit = Some(value.as_str()),
                _ => filters.push(Filter::parse(resource, key, value)?),
            }
        }

        let projection = match select {
            Some(raw) => Projection::parse(resource, raw)?,
            None => Projection::All,
        };

        let sort = match sort {
            Some(raw) => SortKey::parse(resource, raw)?,
            None => SortKey::defaults(resource),
        };

        Ok(Self {
            filters,
            projection,
            sort,
            pagination: Pagination::parse(page, limit)?,
        })
    }

    /// Read the query string of `uri`
    pub fn from_uri(resource: &'static Resource, uri: &Uri) -> Result<Self, QueryError> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map_err(|rejection| QueryError::Malformed(rejection.body_text()))?;
        Self::parse(resource, &pairs)
    }
}

/// Paginated list envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedResults<T = Value> {
    pub success: bool,
    pub current_page: i64,
    pub page_size: i64,
    pub page_count: i64,
    /// Number of items in `data`
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> AdvancedResults<T> {
    /// Build the envelope for one page out of `total` matching rows
    pub fn new(pagination: Pagination, total: i64, data: Vec<T>) -> Self {
        Self {
            success: true,
            current_page: pagination.page,
            page_size: pagination.limit,
            page_count: page_count(total, pagination.limit),
            count: data.len(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for AdvancedResults<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `SELECT COUNT(*) .. WHERE <filters>`
pub fn build_count_query(
    resource: &'static Resource,
    options: &QueryOptions,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("");
    resource.push_count(&mut qb);
    push_filters(&mut qb, &options.filters);
    qb
}

/// `SELECT <documents> .. WHERE <filters> ORDER BY .. LIMIT .. OFFSET ..`
pub fn build_page_query(
    resource: &'static Resource,
    options: &QueryOptions,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("");
    resource.push_select(&mut qb, &options.projection);
    push_filters(&mut qb, &options.filters);
    SortKey::push_order_by(&mut qb, &options.sort);
    qb.push(" LIMIT ");
    qb.push_bind(options.pagination.limit);
    qb.push(" OFFSET ");
    qb.push_bind(options.pagination.offset());
    qb
}

/// Run a list request
///
/// The count and the page are two round trips, not one snapshot; the count
/// applies the same filters as the page.
#[tracing::instrument(
    skip(pool, resource, options),
    fields(
        resource = resource.name,
        filters = options.filters.len(),
        page = options.pagination.page,
        limit = options.pagination.limit
    )
)]
pub async fn advanced_results(
    pool: &PgPool,
    resource: &'static Resource,
    options: &QueryOptions,
) -> Result<AdvancedResults, sqlx::Error> {
    let total: i64 = build_count_query(resource, options)
        .build_query_scalar()
        .fetch_one(pool)
        .await?;

    let data: Vec<Value> = build_page_query(resource, options)
        .build_query_scalar()
        .fetch_all(pool)
        .await?;

    tracing::debug!(total, returned = data.len(), "Advanced results fetched");

    Ok(AdvancedResults::new(options.pagination, total, data))
}

/// Extractor for list query parameters of resource `R`
#[derive(Debug, Clone)]
pub struct AdvancedQuery<R: ResourceSchema> {
    pub options: QueryOptions,
    _resource: PhantomData<fn() -> R>,
}

impl<R: ResourceSchema> AdvancedQuery<R> {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            options,
            _resource: PhantomData,
        }
    }

    /// Run the pipeline for these options
    pub async fn fetch(&self, pool: &PgPool) -> Result<AdvancedResults, AppError> {
        Ok(advanced_results(pool, R::RESOURCE, &self.options).await?)
    }
}

#[axum::async_trait]
impl<S, R> FromRequestParts<S> for AdvancedQuery<R>
where
    S: Send + Sync,
    R: ResourceSchema,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let options = QueryOptions::from_uri(R::RESOURCE, &parts.uri)?;
        Ok(Self::new(options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::query::{FilterValue, Operator};
    use crate::features::shared::resource::fixtures::WIDGETS;
    use serde_json::json;

    fn options(query: &str) -> Result<QueryOptions, QueryError> {
        let uri: Uri = format!("/widgets?{}", query).parse().unwrap();
        QueryOptions::from_uri(&WIDGETS, &uri)
    }

    #[test]
    fn test_reserved_keys_are_not_filters() {
        let options = options("select=name&sort=-price&page=2&limit=5&price[gte]=5").unwrap();
        assert_eq!(options.filters.len(), 1);
        assert_eq!(options.filters[0].operator, Operator::Gte);
        assert_eq!(options.pagination, Pagination { page: 2, limit: 5 });
        assert!(matches!(options.projection, Projection::Fields(ref f) if f.len() == 2));
        assert!(options.sort[0].descending);
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let options = options("tags=Web+Development").unwrap();
        assert_eq!(
            options.filters[0].value,
            FilterValue::Text("Web Development".to_string())
        );
    }

    #[test]
    fn test_percent_encoded_brackets() {
        let options = options("price%5Blte%5D=1000").unwrap();
        assert_eq!(options.filters[0].operator, Operator::Lte);
        assert_eq!(options.filters[0].value, FilterValue::Number(1000.0));
    }

    #[test]
    fn test_empty_query_uses_defaults() {
        let uri: Uri = "/widgets".parse().unwrap();
        let options = QueryOptions::from_uri(&WIDGETS, &uri).unwrap();
        assert!(options.filters.is_empty());
        assert!(matches!(options.projection, Projection::All));
        assert_eq!(options.pagination, Pagination::default());
        assert_eq!(options.sort.len(), 2);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        assert_eq!(options("page=0").unwrap_err(), QueryError::InvalidPage);
        assert!(matches!(options("limit=500"), Err(QueryError::InvalidLimit { .. })));
        assert!(matches!(options("select=secret"), Err(QueryError::UnknownSelectField(_))));
        assert!(matches!(options("sort=secret"), Err(QueryError::UnknownSortField(_))));
        assert!(matches!(options("secret=1"), Err(QueryError::UnknownField(_))));
    }

    #[test]
    fn test_page_query_sql() {
        let options = options("select=name&price[lt]=50&sort=name&page=3&limit=2").unwrap();
        let qb = build_page_query(&WIDGETS, &options);
        assert_eq!(
            qb.sql(),
            "SELECT jsonb_build_object('id', t.id, 'name', t.name) FROM widgets t \
             WHERE t.price < $1 ORDER BY t.name ASC NULLS LAST, t.id ASC NULLS LAST \
             LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_count_query_uses_same_filters() {
        let options = options("price[lt]=50&inStock=true&page=3").unwrap();
        let qb = build_count_query(&WIDGETS, &options);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM widgets t WHERE t.price < $1 AND t.in_stock = $2"
        );
    }

    #[test]
    fn test_envelope_for_partial_listing() {
        // five matches, two per page, first page
        let pagination = Pagination::parse(Some("1"), Some("2")).unwrap();
        let results = AdvancedResults::new(pagination, 5, vec![json!({"id": 1}), json!({"id": 2})]);

        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            json!({
                "success": true,
                "currentPage": 1,
                "pageSize": 2,
                "pageCount": 3,
                "count": 2,
                "data": [{"id": 1}, {"id": 2}]
            })
        );
    }

    #[test]
    fn test_envelope_for_out_of_range_page() {
        let pagination = Pagination::parse(Some("9"), Some("10")).unwrap();
        let results: AdvancedResults = AdvancedResults::new(pagination, 12, vec![]);
        assert_eq!(results.count, 0);
        assert_eq!(results.page_count, 2);
        assert_eq!(results.current_page, 9);
    }
}
