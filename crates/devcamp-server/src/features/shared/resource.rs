//! Resource schemas
//!
//! A [`Resource`] is the static allow-list of everything a client may filter,
//! select or sort on. API names map to SQL expressions over the table alias
//! `t`; user input only ever picks among these expressions and never reaches
//! the SQL text itself.

use serde_json::Value;
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use super::projection::{Projection, SortKey};

/// How a field's values are typed, compared and rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Timestamp,
    Id,
    /// Array of text; equality means containment
    TextList,
    /// Computed JSON (nested objects, populated relations); select only
    Document,
}

impl FieldKind {
    pub fn is_sortable(self) -> bool {
        !matches!(self, FieldKind::TextList | FieldKind::Document)
    }
}

/// One client-visible field
#[derive(Debug)]
pub struct Field {
    /// Name used in query strings and JSON output
    pub name: &'static str,
    /// SQL expression over alias `t`
    pub expr: &'static str,
    pub kind: FieldKind,
    /// Part of the JSON document; filter-only fields are not
    pub projected: bool,
    /// Rendered in place of `expr` in documents (populated relations)
    pub document: Option<&'static str>,
}

impl Field {
    pub const fn new(name: &'static str, expr: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            expr,
            kind,
            projected: true,
            document: None,
        }
    }

    /// Filtered and sorted by `expr`, rendered as `document`
    pub const fn populated(
        name: &'static str,
        expr: &'static str,
        kind: FieldKind,
        document: &'static str,
    ) -> Self {
        Self {
            name,
            expr,
            kind,
            projected: true,
            document: Some(document),
        }
    }

    pub const fn filter_only(name: &'static str, expr: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            expr,
            kind,
            projected: false,
            document: None,
        }
    }

    /// Expression rendered into the JSON document
    pub fn select_expr(&self) -> &'static str {
        self.document.unwrap_or(self.expr)
    }
}

/// A queryable table and its field allow-list
#[derive(Debug)]
pub struct Resource {
    /// Singular name used in messages
    pub name: &'static str,
    pub table: &'static str,
    pub fields: &'static [Field],
}

/// Type-level handle on a static [`Resource`], used by extractors
pub trait ResourceSchema: Send + Sync + 'static {
    const RESOURCE: &'static Resource;
}

impl Resource {
    pub fn field(&'static self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Every field that appears in the default document
    pub fn projected_fields(&'static self) -> impl Iterator<Item = &'static Field> {
        self.fields.iter().filter(|f| f.projected)
    }

    /// Push `SELECT jsonb_build_object(..) FROM <table> t`
    pub fn push_select(&'static self, qb: &mut QueryBuilder<'_, Postgres>, projection: &Projection) {
        qb.push("SELECT jsonb_build_object(");
        for (i, field) in projection.fields(self).into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push("'");
            qb.push(field.name);
            qb.push("', ");
            qb.push(field.select_expr());
        }
        qb.push(") FROM ");
        qb.push(self.table);
        qb.push(" t");
    }

    /// Push `SELECT COUNT(*) FROM <table> t`
    pub fn push_count(&'static self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push("SELECT COUNT(*) FROM ");
        qb.push(self.table);
        qb.push(" t");
    }

    /// Fetch one full document by id
    pub async fn fetch_by_id<'e, E>(&'static self, executor: E, id: Uuid) -> Result<Option<Value>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::new("");
        self.push_select(&mut qb, &Projection::All);
        qb.push(" WHERE t.id = ");
        qb.push_bind(id);

        qb.build_query_scalar::<Value>().fetch_optional(executor).await
    }

    /// Fetch every full document whose `column` equals `id`, newest first
    ///
    /// `column` must be a trusted SQL expression over alias `t`.
    pub async fn fetch_by_parent<'e, E>(
        &'static self,
        executor: E,
        column: &'static str,
        id: Uuid,
    ) -> Result<Vec<Value>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::new("");
        self.push_select(&mut qb, &Projection::All);
        qb.push(" WHERE ");
        qb.push(column);
        qb.push(" = ");
        qb.push_bind(id);
        SortKey::push_order_by(&mut qb, &SortKey::defaults(self));

        qb.build_query_scalar::<Value>().fetch_all(executor).await
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub static WIDGETS: Resource = Resource {
        name: "widget",
        table: "widgets",
        fields: &[
            Field::new("id", "t.id", FieldKind::Id),
            Field::new("name", "t.name", FieldKind::Text),
            Field::new("price", "t.price", FieldKind::Number),
            Field::new("inStock", "t.in_stock", FieldKind::Boolean),
            Field::new("tags", "t.tags", FieldKind::TextList),
            Field::new("owner", "(SELECT 1)", FieldKind::Document),
            Field::populated(
                "maker",
                "t.maker_id",
                FieldKind::Id,
                "(SELECT jsonb_build_object('id', m.id) FROM makers m WHERE m.id = t.maker_id)",
            ),
            Field::new("createdAt", "t.created_at", FieldKind::Timestamp),
            Field::filter_only("location.city", "t.city", FieldKind::Text),
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::fixtures::WIDGETS;
    use super::*;

    #[test]
    fn test_field_lookup() {
        assert_eq!(WIDGETS.field("price").map(|f| f.expr), Some("t.price"));
        assert!(WIDGETS.field("t.price").is_none());
        assert!(WIDGETS.field("missing").is_none());
    }

    #[test]
    fn test_filter_only_fields_are_not_projected() {
        let names: Vec<_> = WIDGETS.projected_fields().map(|f| f.name).collect();
        assert!(names.contains(&"owner"));
        assert!(!names.contains(&"location.city"));
    }

    #[test]
    fn test_push_select_builds_json_document() {
        let mut qb = QueryBuilder::<Postgres>::new("");
        let projection = Projection::Fields(vec![
            WIDGETS.field("id").unwrap(),
            WIDGETS.field("name").unwrap(),
        ]);
        WIDGETS.push_select(&mut qb, &projection);
        assert_eq!(
            qb.sql(),
            "SELECT jsonb_build_object('id', t.id, 'name', t.name) FROM widgets t"
        );
    }

    #[test]
    fn test_populated_field_filters_by_id_and_renders_document() {
        let maker = WIDGETS.field("maker").unwrap();
        assert_eq!(maker.expr, "t.maker_id");

        let mut qb = QueryBuilder::<Postgres>::new("");
        WIDGETS.push_select(&mut qb, &Projection::Fields(vec![maker]));
        assert_eq!(
            qb.sql(),
            "SELECT jsonb_build_object('maker', (SELECT jsonb_build_object('id', m.id) \
             FROM makers m WHERE m.id = t.maker_id)) FROM widgets t"
        );
    }

    #[test]
    fn test_sortable_kinds() {
        assert!(FieldKind::Number.is_sortable());
        assert!(FieldKind::Timestamp.is_sortable());
        assert!(!FieldKind::TextList.is_sortable());
        assert!(!FieldKind::Document.is_sortable());
    }
}
