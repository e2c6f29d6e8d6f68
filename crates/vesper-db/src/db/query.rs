//! Query and pagination helpers
//!
//! Every list endpoint goes through [`execute_paginated_query`]: the caller describes the
//! table, the projected columns, the filter conditions and the sort/page options, and gets a
//! [`Paginated`] page back. Column names only ever come from `&'static str` allowlists; user
//! input reaches the database through bind parameters.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use vesper_core::models::{PageRequest, Paginated, SortOrder};
use vesper_core::AppError;

/// A value bound into a generated statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Uuid(Option<Uuid>),
    Text(Option<String>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f64>),
    Bool(Option<bool>),
    Timestamp(Option<DateTime<Utc>>),
    Json(Option<JsonValue>),
    TextArray(Vec<String>),
    /// Postgres enum value, rendered as `$n::type_name`.
    Enum {
        type_name: &'static str,
        value: String,
    },
}

impl SqlValue {
    pub fn enumeration(type_name: &'static str, value: &str) -> Self {
        SqlValue::Enum {
            type_name,
            value: value.to_string(),
        }
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(Some(v))
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(Some(v))
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(Some(v.to_string()))
    }
}

impl From<Option<String>> for SqlValue {
    fn from(v: Option<String>) -> Self {
        SqlValue::Text(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(Some(v))
    }
}

impl From<Option<i32>> for SqlValue {
    fn from(v: Option<i32>) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::BigInt(Some(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(Some(v))
    }
}

impl From<Option<f64>> for SqlValue {
    fn from(v: Option<f64>) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(Some(v))
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(Some(v))
    }
}

impl From<Option<DateTime<Utc>>> for SqlValue {
    fn from(v: Option<DateTime<Utc>>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<Vec<String>> for SqlValue {
    fn from(v: Vec<String>) -> Self {
        SqlValue::TextArray(v)
    }
}

pub(crate) fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: SqlValue) {
    match value {
        SqlValue::Uuid(v) => {
            qb.push_bind(v);
        }
        SqlValue::Text(v) => {
            qb.push_bind(v);
        }
        SqlValue::Int(v) => {
            qb.push_bind(v);
        }
        SqlValue::BigInt(v) => {
            qb.push_bind(v);
        }
        SqlValue::Float(v) => {
            qb.push_bind(v);
        }
        SqlValue::Bool(v) => {
            qb.push_bind(v);
        }
        SqlValue::Timestamp(v) => {
            qb.push_bind(v);
        }
        SqlValue::Json(v) => {
            qb.push_bind(v);
        }
        SqlValue::TextArray(v) => {
            qb.push_bind(v);
        }
        SqlValue::Enum { type_name, value } => {
            qb.push_bind(value);
            qb.push("::");
            qb.push(type_name);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => " = ",
            CompareOp::NotEq => " <> ",
            CompareOp::Gt => " > ",
            CompareOp::Gte => " >= ",
            CompareOp::Lt => " < ",
            CompareOp::Lte => " <= ",
        }
    }
}

/// Case-insensitive substring match over several columns, OR-ed together.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearch {
    pub fields: Vec<&'static str>,
    pub pattern: String,
}

/// One `WHERE` term; terms are AND-ed.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: &'static str,
        op: CompareOp,
        value: SqlValue,
    },
    IsNull(&'static str),
    NotNull(&'static str),
    /// Case-insensitive equality, for free-text location facets like city or country
    EqIgnoreCase {
        column: &'static str,
        value: String,
    },
    Search(TextSearch),
    /// Static SQL written by the repository, never by the caller
    Raw(&'static str),
}

impl Condition {
    pub fn eq(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Condition::Compare {
            column,
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    pub fn compare(column: &'static str, op: CompareOp, value: impl Into<SqlValue>) -> Self {
        Condition::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn eq_ignore_case(column: &'static str, value: &str) -> Self {
        Condition::EqIgnoreCase {
            column,
            value: value.trim().to_string(),
        }
    }

    fn push(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Condition::Compare { column, op, value } => {
                qb.push(*column);
                qb.push(op.as_sql());
                push_value(qb, value.clone());
            }
            Condition::IsNull(column) => {
                qb.push(*column);
                qb.push(" IS NULL");
            }
            Condition::NotNull(column) => {
                qb.push(*column);
                qb.push(" IS NOT NULL");
            }
            Condition::EqIgnoreCase { column, value } => {
                qb.push("LOWER(");
                qb.push(*column);
                qb.push(") = LOWER(");
                qb.push_bind(value.clone());
                qb.push(")");
            }
            Condition::Search(search) => {
                qb.push("(");
                for (i, field) in search.fields.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(*field);
                    qb.push(" ILIKE ");
                    qb.push_bind(search.pattern.clone());
                }
                qb.push(")");
            }
            Condition::Raw(sql) => {
                qb.push(*sql);
            }
        }
    }
}

/// Append ` WHERE a AND b ...`; nothing when there are no conditions.
pub fn push_where(qb: &mut QueryBuilder<'_, Postgres>, conditions: &[Condition]) {
    for (i, condition) in conditions.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        condition.push(qb);
    }
}

/// Escape `%`, `_` and `\` so the term matches literally inside a LIKE pattern.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build a text search over `fields`. Blank terms produce no condition.
pub fn build_text_search(term: Option<&str>, fields: &[&'static str]) -> Option<Condition> {
    let term = term.map(str::trim).filter(|t| !t.is_empty())?;
    if fields.is_empty() {
        return None;
    }
    Some(Condition::Search(TextSearch {
        fields: fields.to_vec(),
        pattern: format!("%{}%", escape_like(term)),
    }))
}

/// Ordered list of sort keys.
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    keys: Vec<(&'static str, SortOrder)>,
}

impl SortSpec {
    pub fn new(column: &'static str, order: SortOrder) -> Self {
        Self {
            keys: vec![(column, order)],
        }
    }

    pub fn then(mut self, column: &'static str, order: SortOrder) -> Self {
        self.keys.push((column, order));
        self
    }

    pub fn primary(&self) -> (&'static str, SortOrder) {
        self.keys[0]
    }

    fn push(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" ORDER BY ");
        for (i, (column, order)) in self.keys.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(*column);
            qb.push(" ");
            qb.push(order.as_sql());
        }
    }
}

/// Resolve a user-supplied sort field against `allowed`. Unknown or missing fields fall back to
/// `default`; an explicit `order` still applies to the default's primary key.
pub fn build_sort(
    field: Option<&str>,
    order: Option<&str>,
    allowed: &[&'static str],
    default: SortSpec,
) -> SortSpec {
    let requested = field.map(str::trim).filter(|f| !f.is_empty());
    match requested.and_then(|f| allowed.iter().find(|a| **a == f)) {
        Some(column) => SortSpec::new(*column, SortOrder::parse(order)),
        None => match order {
            Some(_) => {
                let mut spec = default;
                spec.keys[0].1 = SortOrder::parse(order);
                spec
            }
            None => default,
        },
    }
}

#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub sort: SortSpec,
    pub page: PageRequest,
}

pub(crate) fn count_query<'a>(table: &str, conditions: &[Condition]) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
    qb.push(table);
    push_where(&mut qb, conditions);
    qb
}

pub(crate) fn page_query<'a>(
    table: &str,
    columns: &str,
    conditions: &[Condition],
    opts: &QueryOptions,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(columns);
    qb.push(" FROM ");
    qb.push(table);
    push_where(&mut qb, conditions);
    opts.sort.push(&mut qb);
    qb.push(" LIMIT ");
    qb.push_bind(opts.page.limit);
    qb.push(" OFFSET ");
    qb.push_bind(opts.page.offset());
    qb
}

/// Count and fetch one page concurrently. The two statements are not in a transaction, so the
/// total can drift from the page under concurrent writes.
#[tracing::instrument(skip(pool, conditions, opts), fields(db.table = %table, db.operation = "select"))]
pub async fn execute_paginated_query<T>(
    pool: &PgPool,
    table: &str,
    columns: &str,
    conditions: &[Condition],
    opts: &QueryOptions,
) -> Result<Paginated<T>, AppError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut count_qb = count_query(table, conditions);
    let mut page_qb = page_query(table, columns, conditions, opts);

    let (total, data) = tokio::try_join!(
        count_qb.build_query_scalar::<i64>().fetch_one(pool),
        page_qb.build_query_as::<T>().fetch_all(pool),
    )?;

    Ok(Paginated::new(data, total, opts.page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_produces_no_condition() {
        assert!(build_text_search(Some("   "), &["title"]).is_none());
        assert!(build_text_search(None, &["title"]).is_none());
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        let condition = build_text_search(Some("100%_\\"), &["title"]).unwrap();
        match condition {
            Condition::Search(search) => assert_eq!(search.pattern, "%100\\%\\_\\\\%"),
            other => panic!("unexpected condition {:?}", other),
        }
    }

    #[test]
    fn search_renders_or_across_fields() {
        let conditions = vec![
            Condition::eq("category", "praise"),
            build_text_search(Some("grace"), &["title", "author", "lyrics"]).unwrap(),
        ];
        let qb = count_query("hymns", &conditions);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM hymns WHERE category = $1 AND (title ILIKE $2 OR author ILIKE $3 OR lyrics ILIKE $4)"
        );
    }

    #[test]
    fn page_query_applies_sort_limit_offset() {
        let opts = QueryOptions {
            sort: SortSpec::new("book_order", SortOrder::Asc)
                .then("chapter", SortOrder::Asc)
                .then("verse", SortOrder::Asc),
            page: PageRequest::from_query(Some(3), Some(10)),
        };
        let qb = page_query("bible_verses", "id, text", &[Condition::Raw("is_deleted = false")], &opts);
        assert_eq!(
            qb.sql(),
            "SELECT id, text FROM bible_verses WHERE is_deleted = false ORDER BY book_order ASC, chapter ASC, verse ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn enum_values_are_cast() {
        let qb = count_query(
            "media",
            &[Condition::eq(
                "moderation_status",
                SqlValue::enumeration("moderation_status", "active"),
            )],
        );
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM media WHERE moderation_status = $1::moderation_status"
        );
    }

    #[test]
    fn sort_falls_back_to_default_for_unknown_fields() {
        let default = SortSpec::new("created_at", SortOrder::Desc);
        let spec = build_sort(Some("password; DROP TABLE"), None, &["title"], default.clone());
        assert_eq!(spec, default);

        let spec = build_sort(Some("title"), Some("asc"), &["title"], default.clone());
        assert_eq!(spec.primary(), ("title", SortOrder::Asc));

        let spec = build_sort(None, Some("asc"), &["title"], default);
        assert_eq!(spec.primary(), ("created_at", SortOrder::Asc));
    }

    #[test]
    fn case_insensitive_equality_renders_lower() {
        let qb = count_query("churches", &[Condition::eq_ignore_case("city", " Lagos ")]);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM churches WHERE LOWER(city) = LOWER($1)"
        );
    }
}
