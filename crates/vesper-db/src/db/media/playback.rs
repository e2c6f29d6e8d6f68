use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vesper_core::models::{NewPlaybackSession, PageRequest, Paginated, PlaybackSession, SortOrder};
use vesper_core::AppError;

use crate::db::query::{execute_paginated_query, Condition, QueryOptions, SortSpec};

const SESSION_COLUMNS: &str = "id, user_id, media_id, duration, current_position, \
    progress_percentage, is_paused, started_at, last_active_at, paused_at, ended_at, end_reason, \
    total_watch_time, device_info, user_agent, view_recorded";

/// Storage operations behind the playback service
#[async_trait::async_trait]
pub trait PlaybackStore: Send + Sync {
    /// Media that exists, is not deleted and has not been removed by moderation
    async fn playable_media_exists(&self, media_id: Uuid) -> Result<bool, AppError>;

    async fn find_session(&self, id: Uuid) -> Result<Option<PlaybackSession>, AppError>;

    async fn find_active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PlaybackSession>, AppError>;

    async fn insert_session(&self, new: NewPlaybackSession)
        -> Result<PlaybackSession, AppError>;

    /// Persist the mutable fields. Returns `None` when the stored row has already ended.
    async fn save_session(
        &self,
        session: &PlaybackSession,
    ) -> Result<Option<PlaybackSession>, AppError>;

    /// Append a `media_views` row, bump `media.view_count` and flag the session, atomically.
    /// Returns `false` when the session's view was already recorded.
    async fn record_view(&self, session: &PlaybackSession) -> Result<bool, AppError>;

    async fn list_history(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<PlaybackSession>, AppError>;
}

/// Repository for playback sessions and media views
#[derive(Clone)]
pub struct PlaybackRepository {
    pool: PgPool,
}

impl PlaybackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PlaybackStore for PlaybackRepository {
    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    async fn playable_media_exists(&self, media_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM media WHERE id = $1 AND is_deleted = false AND moderation_status <> 'removed')",
        )
        .bind(media_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    #[tracing::instrument(skip(self), fields(db.table = "playback_sessions", db.operation = "select", db.record_id = %id))]
    async fn find_session(&self, id: Uuid) -> Result<Option<PlaybackSession>, AppError> {
        let session = sqlx::query_as::<Postgres, PlaybackSession>(&format!(
            "SELECT {} FROM playback_sessions WHERE id = $1",
            SESSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    #[tracing::instrument(skip(self), fields(db.table = "playback_sessions", db.operation = "select"))]
    async fn find_active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PlaybackSession>, AppError> {
        let session = sqlx::query_as::<Postgres, PlaybackSession>(&format!(
            "SELECT {} FROM playback_sessions WHERE user_id = $1 AND ended_at IS NULL AND is_paused = false",
            SESSION_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    #[tracing::instrument(skip(self, new), fields(db.table = "playback_sessions", db.operation = "insert"))]
    async fn insert_session(
        &self,
        new: NewPlaybackSession,
    ) -> Result<PlaybackSession, AppError> {
        let result = sqlx::query_as::<Postgres, PlaybackSession>(&format!(
            r#"
            INSERT INTO playback_sessions (
                user_id, media_id, duration, current_position, progress_percentage,
                started_at, last_active_at, device_info, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $6, $7, $8)
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(new.user_id)
        .bind(new.media_id)
        .bind(new.duration)
        .bind(new.position)
        .bind(new.progress_percentage)
        .bind(new.started_at)
        .bind(&new.device_info)
        .bind(&new.user_agent)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(session) => Ok(session),
            Err(e) => {
                let err = AppError::from(e);
                if err.is_unique_violation() {
                    Err(AppError::Conflict(
                        "Another playback session was started at the same time".to_string(),
                    ))
                } else {
                    Err(err)
                }
            }
        }
    }

    #[tracing::instrument(skip(self, session), fields(db.table = "playback_sessions", db.operation = "update", db.record_id = %session.id))]
    async fn save_session(
        &self,
        session: &PlaybackSession,
    ) -> Result<Option<PlaybackSession>, AppError> {
        let result = sqlx::query_as::<Postgres, PlaybackSession>(&format!(
            r#"
            UPDATE playback_sessions
            SET duration = $2,
                current_position = $3,
                progress_percentage = $4,
                is_paused = $5,
                last_active_at = $6,
                paused_at = $7,
                ended_at = $8,
                end_reason = $9,
                total_watch_time = $10
            WHERE id = $1 AND ended_at IS NULL
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(session.id)
        .bind(session.duration)
        .bind(session.current_position)
        .bind(session.progress_percentage)
        .bind(session.is_paused)
        .bind(session.last_active_at)
        .bind(session.paused_at)
        .bind(session.ended_at)
        .bind(session.end_reason)
        .bind(session.total_watch_time)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(saved) => Ok(saved),
            Err(e) => {
                let err = AppError::from(e);
                if err.is_unique_violation() {
                    Err(AppError::Conflict(
                        "Another playback session is already active".to_string(),
                    ))
                } else {
                    Err(err)
                }
            }
        }
    }

    #[tracing::instrument(skip(self, session), fields(db.table = "media_views", db.operation = "insert", db.record_id = %session.id))]
    async fn record_view(&self, session: &PlaybackSession) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let flagged = sqlx::query(
            "UPDATE playback_sessions SET view_recorded = true WHERE id = $1 AND view_recorded = false",
        )
        .bind(session.id)
        .execute(&mut *tx)
        .await?;

        if flagged.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO media_views (media_id, user_id, session_id, watched_seconds)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(session.media_id)
        .bind(session.user_id)
        .bind(session.id)
        .bind(session.total_watch_time)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE media SET view_count = view_count + 1 WHERE id = $1")
            .bind(session.media_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    #[tracing::instrument(skip(self), fields(db.table = "playback_sessions", db.operation = "select"))]
    async fn list_history(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<PlaybackSession>, AppError> {
        let opts = QueryOptions {
            sort: SortSpec::new("started_at", SortOrder::Desc),
            page,
        };
        execute_paginated_query(
            &self.pool,
            "playback_sessions",
            SESSION_COLUMNS,
            &[Condition::eq("user_id", user_id)],
            &opts,
        )
        .await
    }
}
