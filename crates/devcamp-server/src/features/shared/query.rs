//! Query-string filter translation
//!
//! Turns `field=value` and `field[op]=value` pairs into typed [`Filter`]s and
//! pushes them as bound SQL predicates. Only the bracketed key position is
//! read as an operator: `?name=gt` filters on the literal text `gt`.
//!
//! | key               | predicate                               |
//! |-------------------|-----------------------------------------|
//! | `tuition=100`     | `t.tuition = $1`                        |
//! | `tuition[lte]=1k` | rejected: `1k` is not a number          |
//! | `weeks[gte]=8`    | `t.weeks >= $1`                         |
//! | `name[in]=a,b`    | `t.name = ANY($1)`                      |
//! | `careers=UI/UX`   | `$1 = ANY(t.careers)` (containment)     |
//! | `careers[in]=a,b` | `t.careers && $1` (overlap)             |

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Postgres, QueryBuilder};
use thiserror::Error;
use uuid::Uuid;

use super::resource::{Field, FieldKind, Resource};
use crate::error::AppError;

/// Errors raised while reading list query parameters
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("Invalid query string: {0}")]
    Malformed(String),

    #[error("Unknown filter field '{0}'")]
    UnknownField(String),

    #[error("Unknown operator '{operator}' on field '{field}'")]
    UnknownOperator { field: String, operator: String },

    #[error("Operator '{operator}' is not supported on field '{field}'")]
    UnsupportedOperator {
        field: &'static str,
        operator: &'static str,
    },

    #[error("Invalid value '{value}' for field '{field}': expected {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Unknown select field '{0}'")]
    UnknownSelectField(String),

    #[error("Unknown sort field '{0}'")]
    UnknownSortField(String),

    #[error("Page must be a whole number greater than 0")]
    InvalidPage,

    #[error("Limit must be a whole number between 1 and {max}")]
    InvalidLimit { max: i64 },
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Comparison operator of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Operator {
    /// Parse the bracketed operator of a key
    pub fn from_key(op: &str) -> Option<Self> {
        match op {
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            "in" => Some(Operator::In),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::In => "= ANY",
        }
    }

    fn supported_by(self, kind: FieldKind) -> bool {
        match kind {
            FieldKind::Text | FieldKind::TextList | FieldKind::Id => {
                matches!(self, Operator::Eq | Operator::In)
            },
            FieldKind::Number => true,
            FieldKind::Timestamp => !matches!(self, Operator::In),
            FieldKind::Boolean => matches!(self, Operator::Eq),
            FieldKind::Document => false,
        }
    }
}

/// A coerced filter value, typed by its field
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Id(Uuid),
    TextList(Vec<String>),
    NumberList(Vec<f64>),
    IdList(Vec<Uuid>),
}

/// One translated `key=value` pair
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: &'static Field,
    pub operator: Operator,
    pub value: FilterValue,
}

impl Filter {
    /// Translate a single query pair against `resource`
    pub fn parse(resource: &'static Resource, key: &str, raw: &str) -> Result<Self, QueryError> {
        let (name, operator) = split_key(key)?;

        let field = resource
            .field(name)
            .filter(|f| f.kind != FieldKind::Document)
            .ok_or_else(|| QueryError::UnknownField(name.to_string()))?;

        let operator = match operator {
            None => Operator::Eq,
            Some(op) => Operator::from_key(op).ok_or_else(|| QueryError::UnknownOperator {
                field: name.to_string(),
                operator: op.to_string(),
            })?,
        };

        if !operator.supported_by(field.kind) {
            return Err(QueryError::UnsupportedOperator {
                field: field.name,
                operator: operator.as_str(),
            });
        }

        let value = if operator == Operator::In {
            coerce_list(field, raw)?
        } else {
            coerce_scalar(field, raw)?
        };

        Ok(Filter {
            field,
            operator,
            value,
        })
    }

    /// Push this filter as a predicate with bound values
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match (self.field.kind, self.operator) {
            (FieldKind::TextList, Operator::Eq) => {
                push_value(qb, &self.value);
                qb.push(" = ANY(");
                qb.push(self.field.expr);
                qb.push(")");
            },
            (FieldKind::TextList, Operator::In) => {
                qb.push(self.field.expr);
                qb.push(" && ");
                push_value(qb, &self.value);
            },
            (_, Operator::In) => {
                qb.push(self.field.expr);
                qb.push(" = ANY(");
                push_value(qb, &self.value);
                qb.push(")");
            },
            (_, operator) => {
                qb.push(self.field.expr);
                qb.push(" ");
                qb.push(operator.sql());
                qb.push(" ");
                push_value(qb, &self.value);
            },
        }
    }
}

/// Push ` WHERE a AND b ..`; nothing when `filters` is empty
pub fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) {
    for (i, filter) in filters.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        filter.push_sql(qb);
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::Text(v) => qb.push_bind(v.clone()),
        FilterValue::Number(v) => qb.push_bind(*v),
        FilterValue::Boolean(v) => qb.push_bind(*v),
        FilterValue::Timestamp(v) => qb.push_bind(*v),
        FilterValue::Id(v) => qb.push_bind(*v),
        FilterValue::TextList(v) => qb.push_bind(v.clone()),
        FilterValue::NumberList(v) => qb.push_bind(v.clone()),
        FilterValue::IdList(v) => qb.push_bind(v.clone()),
    };
}

/// Split `name[op]` into its parts
fn split_key(key: &str) -> Result<(&str, Option<&str>), QueryError> {
    let Some(open) = key.find('[') else {
        return Ok((key, None));
    };

    let name = &key[..open];
    let operator = key[open + 1..]
        .strip_suffix(']')
        .filter(|op| !op.contains(['[', ']']))
        .ok_or_else(|| QueryError::Malformed(key.to_string()))?;

    if name.is_empty() {
        return Err(QueryError::Malformed(key.to_string()));
    }

    Ok((name, Some(operator)))
}

fn coerce_scalar(field: &'static Field, raw: &str) -> Result<FilterValue, QueryError> {
    let invalid = |expected| QueryError::InvalidValue {
        field: field.name,
        value: raw.to_string(),
        expected,
    };

    match field.kind {
        FieldKind::Text | FieldKind::TextList => Ok(FilterValue::Text(raw.to_string())),
        FieldKind::Number => parse_number(raw).map(FilterValue::Number).ok_or_else(|| invalid("a number")),
        FieldKind::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(FilterValue::Boolean(true)),
            "false" => Ok(FilterValue::Boolean(false)),
            _ => Err(invalid("true or false")),
        },
        FieldKind::Timestamp => parse_timestamp(raw)
            .map(FilterValue::Timestamp)
            .ok_or_else(|| invalid("an RFC 3339 timestamp or YYYY-MM-DD date")),
        FieldKind::Id => Uuid::parse_str(raw.trim())
            .map(FilterValue::Id)
            .map_err(|_| invalid("an id")),
        FieldKind::Document => Err(QueryError::UnknownField(field.name.to_string())),
    }
}

fn coerce_list(field: &'static Field, raw: &str) -> Result<FilterValue, QueryError> {
    let items: Vec<&str> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();

    if items.is_empty() {
        return Err(QueryError::InvalidValue {
            field: field.name,
            value: raw.to_string(),
            expected: "a comma-separated list",
        });
    }

    let mut text = Vec::new();
    let mut numbers = Vec::new();
    let mut ids = Vec::new();

    for item in items {
        match coerce_scalar(field, item)? {
            FilterValue::Text(v) => text.push(v),
            FilterValue::Number(v) => numbers.push(v),
            FilterValue::Id(v) => ids.push(v),
            _ => {
                return Err(QueryError::UnsupportedOperator {
                    field: field.name,
                    operator: Operator::In.as_str(),
                })
            },
        }
    }

    Ok(match field.kind {
        FieldKind::Number => FilterValue::NumberList(numbers),
        FieldKind::Id => FilterValue::IdList(ids),
        _ => FilterValue::TextList(text),
    })
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
