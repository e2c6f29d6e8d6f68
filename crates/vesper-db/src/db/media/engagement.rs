use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vesper_core::models::{
    Bookmark, BookmarkWithMedia, PageRequest, Paginated, SortOrder, ToggleResult,
};
use vesper_core::AppError;

use crate::db::query::{execute_paginated_query, Condition, QueryOptions, SortSpec};

/// Storage operations behind bookmarks and likes
#[async_trait::async_trait]
pub trait EngagementStore: Send + Sync {
    async fn media_exists(&self, media_id: Uuid) -> Result<bool, AppError>;

    /// Remove the bookmark if present, otherwise add it; adjusts `media.bookmark_count` in the
    /// same transaction.
    async fn toggle_bookmark(&self, user_id: Uuid, media_id: Uuid)
        -> Result<ToggleResult, AppError>;

    /// Same as [`EngagementStore::toggle_bookmark`] for likes and `media.like_count`.
    async fn toggle_like(&self, user_id: Uuid, media_id: Uuid) -> Result<ToggleResult, AppError>;

    async fn list_bookmarks(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<BookmarkWithMedia>, AppError>;

    async fn find_bookmark(&self, id: Uuid) -> Result<Option<Bookmark>, AppError>;

    async fn delete_bookmark(&self, bookmark: &Bookmark) -> Result<bool, AppError>;
}

/// Relation table and the counter column it feeds.
struct ToggleTarget {
    table: &'static str,
    counter: &'static str,
}

const BOOKMARKS: ToggleTarget = ToggleTarget {
    table: "bookmarks",
    counter: "bookmark_count",
};

const LIKES: ToggleTarget = ToggleTarget {
    table: "media_likes",
    counter: "like_count",
};

/// Repository for bookmarks and likes
#[derive(Clone)]
pub struct EngagementRepository {
    pool: PgPool,
}

impl EngagementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn toggle(
        &self,
        target: &ToggleTarget,
        user_id: Uuid,
        media_id: Uuid,
    ) -> Result<ToggleResult, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = $1 AND media_id = $2",
            target.table
        ))
        .bind(user_id)
        .bind(media_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        let (active, delta) = if removed {
            (false, -1i64)
        } else {
            let inserted = sqlx::query(&format!(
                "INSERT INTO {} (user_id, media_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
                target.table
            ))
            .bind(user_id)
            .bind(media_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
                > 0;
            (true, if inserted { 1 } else { 0 })
        };

        let count = sqlx::query_scalar::<Postgres, i64>(&format!(
            "UPDATE media SET {counter} = GREATEST({counter} + $2, 0) WHERE id = $1 RETURNING {counter}",
            counter = target.counter
        ))
        .bind(media_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ToggleResult { active, count })
    }
}

#[async_trait::async_trait]
impl EngagementStore for EngagementRepository {
    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    async fn media_exists(&self, media_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM media WHERE id = $1 AND is_deleted = false)",
        )
        .bind(media_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    #[tracing::instrument(skip(self), fields(db.table = "bookmarks", db.operation = "upsert"))]
    async fn toggle_bookmark(
        &self,
        user_id: Uuid,
        media_id: Uuid,
    ) -> Result<ToggleResult, AppError> {
        self.toggle(&BOOKMARKS, user_id, media_id).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_likes", db.operation = "upsert"))]
    async fn toggle_like(&self, user_id: Uuid, media_id: Uuid) -> Result<ToggleResult, AppError> {
        self.toggle(&LIKES, user_id, media_id).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "bookmarks", db.operation = "select"))]
    async fn list_bookmarks(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<BookmarkWithMedia>, AppError> {
        let opts = QueryOptions {
            sort: SortSpec::new("b.created_at", SortOrder::Desc),
            page,
        };
        execute_paginated_query(
            &self.pool,
            "bookmarks b JOIN media m ON m.id = b.media_id",
            "b.id, b.media_id, b.created_at, m.title, m.media_type, m.url, m.duration_seconds",
            &[
                Condition::eq("b.user_id", user_id),
                Condition::Raw("m.is_deleted = false"),
            ],
            &opts,
        )
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "bookmarks", db.operation = "select", db.record_id = %id))]
    async fn find_bookmark(&self, id: Uuid) -> Result<Option<Bookmark>, AppError> {
        let bookmark = sqlx::query_as::<Postgres, Bookmark>(
            "SELECT id, user_id, media_id, created_at FROM bookmarks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bookmark)
    }

    #[tracing::instrument(skip(self, bookmark), fields(db.table = "bookmarks", db.operation = "delete", db.record_id = %bookmark.id))]
    async fn delete_bookmark(&self, bookmark: &Bookmark) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM bookmarks WHERE id = $1")
            .bind(bookmark.id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;
        if removed {
            sqlx::query(
                "UPDATE media SET bookmark_count = GREATEST(bookmark_count - 1, 0) WHERE id = $1",
            )
            .bind(bookmark.media_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(removed)
    }
}
