//! Generic table-backed CRUD
//!
//! A [`ResourceTable`] describes one table (name, projection, searchable and sortable columns,
//! soft-delete behaviour). [`PgResourceStore`] turns that description into the list / get /
//! insert / update / delete statements the base controller needs.

use std::marker::PhantomData;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use vesper_core::models::{PageRequest, Paginated, SortOrder};
use vesper_core::AppError;

use super::query::{
    build_sort, build_text_search, execute_paginated_query, push_value, push_where, Condition,
    QueryOptions, SortSpec, SqlValue,
};

/// Column/value pairs for an insert or update.
pub type ColumnValues = Vec<(&'static str, SqlValue)>;

/// Static description of a table served through [`PgResourceStore`].
pub trait ResourceTable: Send + Sync + 'static {
    type Record: for<'r> FromRow<'r, PgRow> + Send + Unpin;

    const TABLE: &'static str;
    /// Projection used by every `SELECT` and `RETURNING`
    const COLUMNS: &'static str;
    const SEARCHABLE: &'static [&'static str] = &[];
    const SORTABLE: &'static [&'static str] = &["created_at"];
    const DEFAULT_SORT: &'static str = "created_at";
    const DEFAULT_ORDER: SortOrder = SortOrder::Desc;
    /// Rows carry `is_deleted`/`deleted_at` and are hidden instead of removed
    const SOFT_DELETE: bool = false;
    /// Table has an `updated_at` column refreshed on update
    const TRACKS_UPDATES: bool = false;

    /// Filters applied to every list query
    fn static_filters() -> Vec<Condition> {
        Vec::new()
    }

    fn default_sort() -> SortSpec {
        SortSpec::new(Self::DEFAULT_SORT, Self::DEFAULT_ORDER)
    }
}

/// List parameters after parsing, before they are turned into SQL.
#[derive(Debug, Clone, Default)]
pub struct ListParams<'a> {
    pub conditions: Vec<Condition>,
    pub search: Option<&'a str>,
    pub sort: Option<&'a str>,
    pub order: Option<&'a str>,
    pub page: PageRequest,
}

pub struct PgResourceStore<R: ResourceTable> {
    pool: PgPool,
    _table: PhantomData<fn() -> R>,
}

impl<R: ResourceTable> Clone for PgResourceStore<R> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<R: ResourceTable> PgResourceStore<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _table: PhantomData,
        }
    }

    fn visibility_filter(conditions: &mut Vec<Condition>) {
        if R::SOFT_DELETE {
            conditions.push(Condition::Raw("is_deleted = false"));
        }
    }

    /// Static filters, caller filters, soft-delete visibility and text search, AND-ed.
    pub fn list_conditions(params: &ListParams<'_>) -> Vec<Condition> {
        let mut conditions = R::static_filters();
        conditions.extend(params.conditions.iter().cloned());
        Self::visibility_filter(&mut conditions);
        if let Some(search) = build_text_search(params.search, R::SEARCHABLE) {
            conditions.push(search);
        }
        conditions
    }

    #[tracing::instrument(skip(self, params), fields(db.table = R::TABLE, db.operation = "select"))]
    pub async fn find_page(&self, params: ListParams<'_>) -> Result<Paginated<R::Record>, AppError> {
        let conditions = Self::list_conditions(&params);
        let opts = QueryOptions {
            sort: build_sort(params.sort, params.order, R::SORTABLE, R::default_sort()),
            page: params.page,
        };
        execute_paginated_query(&self.pool, R::TABLE, R::COLUMNS, &conditions, &opts).await
    }

    /// Soft-deleted rows are not found.
    #[tracing::instrument(skip(self), fields(db.table = R::TABLE, db.operation = "select", db.record_id = %id))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<R::Record>, AppError> {
        let mut conditions = vec![Condition::eq("id", id)];
        Self::visibility_filter(&mut conditions);

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(R::COLUMNS);
        qb.push(" FROM ");
        qb.push(R::TABLE);
        push_where(&mut qb, &conditions);

        let record = qb
            .build_query_as::<R::Record>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self, values), fields(db.table = R::TABLE, db.operation = "insert"))]
    pub async fn insert(&self, values: ColumnValues) -> Result<R::Record, AppError> {
        if values.is_empty() {
            return Err(AppError::Internal(format!(
                "Insert into {} without values",
                R::TABLE
            )));
        }
        let qb = insert_query(R::TABLE, R::COLUMNS, values);
        let record = build_and_fetch_one::<R>(qb, &self.pool).await?;
        Ok(record)
    }

    /// Returns `None` when the row does not exist (or is soft-deleted). An empty update
    /// returns the current row unchanged.
    #[tracing::instrument(skip(self, values), fields(db.table = R::TABLE, db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        values: ColumnValues,
    ) -> Result<Option<R::Record>, AppError> {
        if values.is_empty() {
            return self.find_by_id(id).await;
        }
        let mut qb = update_query(R::TABLE, values, R::TRACKS_UPDATES);
        let mut conditions = vec![Condition::eq("id", id)];
        Self::visibility_filter(&mut conditions);
        push_where(&mut qb, &conditions);
        qb.push(" RETURNING ");
        qb.push(R::COLUMNS);

        let record = qb
            .build_query_as::<R::Record>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = R::TABLE, db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM ");
        qb.push(R::TABLE);
        push_where(&mut qb, &[Condition::eq("id", id)]);
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Marks the row deleted. Returns `false` if it was missing or already deleted.
    #[tracing::instrument(skip(self), fields(db.table = R::TABLE, db.operation = "update", db.record_id = %id))]
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE ");
        qb.push(R::TABLE);
        qb.push(" SET is_deleted = true, deleted_at = NOW()");
        push_where(
            &mut qb,
            &[Condition::eq("id", id), Condition::Raw("is_deleted = false")],
        );
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard or soft delete depending on the table.
    pub async fn remove(&self, id: Uuid) -> Result<bool, AppError> {
        if R::SOFT_DELETE {
            self.soft_delete(id).await
        } else {
            self.delete(id).await
        }
    }
}

async fn build_and_fetch_one<R: ResourceTable>(
    mut qb: QueryBuilder<'_, Postgres>,
    pool: &PgPool,
) -> Result<R::Record, sqlx::Error> {
    qb.build_query_as::<R::Record>().fetch_one(pool).await
}

pub(crate) fn insert_query<'a>(
    table: &str,
    returning: &str,
    values: ColumnValues,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("INSERT INTO ");
    qb.push(table);
    qb.push(" (");
    for (i, (column, _)) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column);
    }
    qb.push(") VALUES (");
    for (i, (_, value)) in values.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, value);
    }
    qb.push(") RETURNING ");
    qb.push(returning);
    qb
}

pub(crate) fn update_query<'a>(
    table: &str,
    values: ColumnValues,
    touch_updated_at: bool,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE ");
    qb.push(table);
    qb.push(" SET ");
    for (i, (column, value)) in values.into_iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(column);
        qb.push(" = ");
        push_value(&mut qb, value);
    }
    if touch_updated_at {
        qb.push(", updated_at = NOW()");
    }
    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[derive(sqlx::FromRow)]
    #[allow(dead_code)]
    struct Row {
        id: Uuid,
        created_at: DateTime<Utc>,
    }

    struct Posts;

    impl ResourceTable for Posts {
        type Record = Row;
        const TABLE: &'static str = "forum_posts";
        const COLUMNS: &'static str = "id, created_at";
        const SEARCHABLE: &'static [&'static str] = &["title", "content"];
        const SOFT_DELETE: bool = true;
        const TRACKS_UPDATES: bool = true;

        fn static_filters() -> Vec<Condition> {
            vec![Condition::Raw("author_id IS NOT NULL")]
        }
    }

    #[test]
    fn insert_renders_columns_and_returning() {
        let qb = insert_query(
            "hymns",
            "id, title",
            vec![("title", "Amazing Grace".into()), ("number", 12.into())],
        );
        assert_eq!(
            qb.sql(),
            "INSERT INTO hymns (title, number) VALUES ($1, $2) RETURNING id, title"
        );
    }

    #[test]
    fn update_touches_updated_at_when_tracked() {
        let qb = update_query("forum_posts", vec![("title", "New".into())], true);
        assert_eq!(qb.sql(), "UPDATE forum_posts SET title = $1, updated_at = NOW()");
        let qb = update_query("hymns", vec![("title", "New".into())], false);
        assert_eq!(qb.sql(), "UPDATE hymns SET title = $1");
    }

    #[test]
    fn list_conditions_merge_static_query_visibility_and_search() {
        let params = ListParams {
            conditions: vec![Condition::eq_ignore_case("category", "testimony")],
            search: Some("grace"),
            ..Default::default()
        };
        let conditions = PgResourceStore::<Posts>::list_conditions(&params);
        assert_eq!(conditions.len(), 4);
        assert_eq!(conditions[0], Condition::Raw("author_id IS NOT NULL"));
        assert_eq!(conditions[2], Condition::Raw("is_deleted = false"));
        assert!(matches!(conditions[3], Condition::Search(_)));
    }
}
