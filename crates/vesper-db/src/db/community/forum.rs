use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vesper_core::models::{
    ForumReply, PageRequest, Paginated, PostedReply, SortOrder, ToggleResult,
};
use vesper_core::AppError;

use crate::db::query::{execute_paginated_query, Condition, QueryOptions, SortSpec};

/// Forum operations beyond plain post CRUD: likes and replies
#[derive(Clone)]
pub struct ForumRepository {
    pool: PgPool,
}

impl ForumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "forum_posts", db.operation = "select"))]
    pub async fn post_exists(&self, post_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM forum_posts WHERE id = $1 AND is_deleted = false)",
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Like the post if the user has not, otherwise unlike it.
    #[tracing::instrument(skip(self), fields(db.table = "forum_post_likes", db.operation = "upsert"))]
    pub async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<ToggleResult, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM forum_post_likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        let delta: i64 = if removed {
            -1
        } else {
            let inserted = sqlx::query(
                "INSERT INTO forum_post_likes (user_id, post_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            inserted as i64
        };

        let count = sqlx::query_scalar::<Postgres, i64>(
            "UPDATE forum_posts SET like_count = GREATEST(like_count + $2, 0) WHERE id = $1 RETURNING like_count",
        )
        .bind(post_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ToggleResult {
            active: !removed,
            count,
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "forum_replies", db.operation = "select"))]
    pub async fn list_replies(
        &self,
        post_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<ForumReply>, AppError> {
        let opts = QueryOptions {
            sort: SortSpec::new("created_at", SortOrder::Asc),
            page,
        };
        execute_paginated_query(
            &self.pool,
            "forum_replies",
            "id, post_id, author_id, content, created_at",
            &[Condition::eq("post_id", post_id)],
            &opts,
        )
        .await
    }

    /// Insert a reply and bump the post's `reply_count`. Returns `None` if the post is gone.
    #[tracing::instrument(skip(self, content), fields(db.table = "forum_replies", db.operation = "insert"))]
    pub async fn create_reply(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Option<PostedReply>, AppError> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<Postgres, (Uuid, String)>(
            r#"
            UPDATE forum_posts SET reply_count = reply_count + 1
            WHERE id = $1 AND is_deleted = false
            RETURNING author_id, title
            "#,
        )
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((post_author_id, post_title)) = post else {
            tx.rollback().await?;
            return Ok(None);
        };

        let reply = sqlx::query_as::<Postgres, ForumReply>(
            r#"
            INSERT INTO forum_replies (post_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, content, created_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(PostedReply {
            reply,
            post_author_id,
            post_title,
        }))
    }
}
