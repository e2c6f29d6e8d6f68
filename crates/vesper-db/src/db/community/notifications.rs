use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vesper_core::models::{NewNotification, Notification, PageRequest, Paginated, SortOrder};
use vesper_core::AppError;

use crate::db::query::{execute_paginated_query, Condition, QueryOptions, SortSpec};

const NOTIFICATION_COLUMNS: &str = "id, user_id, kind, title, body, link, is_read, created_at";

/// Write side used by the outbound event sinks
#[async_trait::async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create_many(&self, notifications: &[NewNotification]) -> Result<u64, AppError>;

    /// `(id, email)` of every moderator and admin
    async fn staff_recipients(&self) -> Result<Vec<(Uuid, String)>, AppError>;
}

/// Repository for user notifications
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "select"))]
    pub async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Paginated<Notification>, AppError> {
        let mut conditions = vec![Condition::eq("user_id", user_id)];
        if unread_only {
            conditions.push(Condition::Raw("is_read = false"));
        }
        let opts = QueryOptions {
            sort: SortSpec::new("created_at", SortOrder::Desc),
            page,
        };
        execute_paginated_query(
            &self.pool,
            "notifications",
            NOTIFICATION_COLUMNS,
            &conditions,
            &opts,
        )
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "count"))]
    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "select", db.record_id = %id))]
    pub async fn find(&self, id: Uuid) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<Postgres, Notification>(&format!(
            "SELECT {} FROM notifications WHERE id = $1",
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(notification)
    }

    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "update", db.record_id = %id))]
    pub async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<Postgres, Notification>(&format!(
            "UPDATE notifications SET is_read = true WHERE id = $1 RETURNING {}",
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(notification)
    }

    /// Returns how many notifications changed.
    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "update"))]
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "notifications", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl NotificationStore for NotificationRepository {
    #[tracing::instrument(skip(self, notifications), fields(db.table = "notifications", db.operation = "insert", count = notifications.len()))]
    async fn create_many(&self, notifications: &[NewNotification]) -> Result<u64, AppError> {
        if notifications.is_empty() {
            return Ok(0);
        }
        let mut qb = sqlx::QueryBuilder::<Postgres>::new(
            "INSERT INTO notifications (user_id, kind, title, body, link) ",
        );
        qb.push_values(notifications, |mut row, n| {
            row.push_bind(n.user_id)
                .push_bind(n.kind)
                .push_bind(n.title.clone())
                .push_bind(n.body.clone())
                .push_bind(n.link.clone());
        });
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn staff_recipients(&self) -> Result<Vec<(Uuid, String)>, AppError> {
        let staff = sqlx::query_as::<Postgres, (Uuid, String)>(
            "SELECT id, email FROM users WHERE role IN ('moderator', 'admin') ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(staff)
    }
}
