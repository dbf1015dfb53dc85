//! Field projection (`select`) and ordering (`sort`)

use sqlx::{Postgres, QueryBuilder};

use super::query::QueryError;
use super::resource::{Field, Resource};

/// Field that sorts when the request names none
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

/// Which fields go into each returned document
#[derive(Debug, Clone, Default)]
pub enum Projection {
    /// Every projected field of the resource
    #[default]
    All,
    /// An explicit allow-list; always starts with `id`
    Fields(Vec<&'static Field>),
}

impl Projection {
    /// Parse `select=a,b,c`
    ///
    /// `id` is always included. Duplicate names collapse. Unknown or
    /// filter-only names are rejected.
    pub fn parse(resource: &'static Resource, raw: &str) -> Result<Self, QueryError> {
        let mut fields: Vec<&'static Field> = Vec::new();
        if let Some(id) = resource.field("id") {
            fields.push(id);
        }

        for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let field = resource
                .field(name)
                .filter(|f| f.projected)
                .ok_or_else(|| QueryError::UnknownSelectField(name.to_string()))?;
            if !fields.iter().any(|f| std::ptr::eq(*f, field)) {
                fields.push(field);
            }
        }

        Ok(Projection::Fields(fields))
    }

    pub fn fields(&self, resource: &'static Resource) -> Vec<&'static Field> {
        match self {
            Projection::All => resource.projected_fields().collect(),
            Projection::Fields(fields) => fields.clone(),
        }
    }
}

/// One `ORDER BY` term
#[derive(Debug, Clone, Copy)]
pub struct SortKey {
    pub field: &'static Field,
    pub descending: bool,
}

impl SortKey {
    /// Parse `sort=name,-createdAt`
    ///
    /// A leading `-` sorts descending. Keys apply in order and `id` is appended
    /// as the final tiebreaker so pages are stable.
    pub fn parse(resource: &'static Resource, raw: &str) -> Result<Vec<Self>, QueryError> {
        let mut keys: Vec<SortKey> = Vec::new();

        for term in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (name, descending) = match term.strip_prefix('-') {
                Some(name) => (name, true),
                None => (term.strip_prefix('+').unwrap_or(term), false),
            };

            let field = resource
                .field(name)
                .filter(|f| f.projected && f.kind.is_sortable())
                .ok_or_else(|| QueryError::UnknownSortField(name.to_string()))?;

            if !keys.iter().any(|k| std::ptr::eq(k.field, field)) {
                keys.push(SortKey { field, descending });
            }
        }

        if keys.is_empty() {
            return Ok(Self::defaults(resource));
        }

        Self::push_tiebreaker(resource, &mut keys);
        Ok(keys)
    }

    /// Newest first, then by id
    pub fn defaults(resource: &'static Resource) -> Vec<Self> {
        let mut keys: Vec<SortKey> = resource
            .field(DEFAULT_SORT_FIELD)
            .map(|field| SortKey {
                field,
                descending: true,
            })
            .into_iter()
            .collect();
        Self::push_tiebreaker(resource, &mut keys);
        keys
    }

    fn push_tiebreaker(resource: &'static Resource, keys: &mut Vec<SortKey>) {
        if let Some(id) = resource.field("id") {
            if !keys.iter().any(|k| std::ptr::eq(k.field, id)) {
                keys.push(SortKey {
                    field: id,
                    descending: false,
                });
            }
        }
    }

    /// Push ` ORDER BY ..` for `keys`; nothing when empty
    pub fn push_order_by(qb: &mut QueryBuilder<'_, Postgres>, keys: &[SortKey]) {
        for (i, key) in keys.iter().enumerate() {
            qb.push(if i == 0 { " ORDER BY " } else { ", " });
            qb.push(key.field.expr);
            qb.push(if key.descending { " DESC NULLS LAST" } else { " ASC NULLS LAST" });
        }
    }
}
