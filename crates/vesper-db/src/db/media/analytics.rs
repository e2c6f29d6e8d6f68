use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vesper_core::models::{DailyViews, DashboardStats, MediaAnalytics, PlatformTotals, TopMedia};
use vesper_core::AppError;

const TOP_MEDIA_LIMIT: i64 = 10;

/// Read-only aggregate queries for the analytics endpoints
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "aggregate"))]
    pub async fn platform_totals(&self) -> Result<PlatformTotals, AppError> {
        let totals = sqlx::query_as::<Postgres, PlatformTotals>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM media WHERE is_deleted = false) AS total_media,
                (SELECT COUNT(*) FROM media_views) AS total_views,
                (SELECT COUNT(*) FROM playback_sessions
                    WHERE ended_at IS NULL AND is_paused = false) AS active_sessions,
                (SELECT COUNT(*) FROM media_reports WHERE status = 'pending') AS pending_reports
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    pub async fn top_media(&self, limit: i64) -> Result<Vec<TopMedia>, AppError> {
        let media = sqlx::query_as::<Postgres, TopMedia>(
            r#"
            SELECT id, title, view_count
            FROM media
            WHERE is_deleted = false
            ORDER BY view_count DESC, created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(media)
    }

    /// One row per day for the last `days` days, zero-filled.
    #[tracing::instrument(skip(self), fields(db.table = "media_views", db.operation = "aggregate"))]
    pub async fn views_per_day(&self, days: i32) -> Result<Vec<DailyViews>, AppError> {
        let rows = sqlx::query_as::<Postgres, DailyViews>(
            r#"
            SELECT d.day::date AS day, COUNT(v.id) AS views
            FROM generate_series(
                CURRENT_DATE - ($1::int - 1),
                CURRENT_DATE,
                INTERVAL '1 day'
            ) AS d(day)
            LEFT JOIN media_views v ON v.created_at::date = d.day::date
            GROUP BY d.day
            ORDER BY d.day
            "#,
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn dashboard(&self, days: i32) -> Result<DashboardStats, AppError> {
        let (totals, top_media, views_per_day) = tokio::try_join!(
            self.platform_totals(),
            self.top_media(TOP_MEDIA_LIMIT),
            self.views_per_day(days),
        )?;
        Ok(DashboardStats {
            totals,
            top_media,
            views_per_day,
            days,
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_views", db.operation = "aggregate", db.record_id = %media_id))]
    pub async fn media_analytics(&self, media_id: Uuid) -> Result<MediaAnalytics, AppError> {
        let analytics = sqlx::query_as::<Postgres, MediaAnalytics>(
            r#"
            SELECT
                m.id AS media_id,
                (SELECT COUNT(*) FROM media_views v WHERE v.media_id = m.id) AS views,
                (SELECT COUNT(DISTINCT v.user_id) FROM media_views v WHERE v.media_id = m.id)
                    AS unique_viewers,
                m.like_count AS likes,
                m.bookmark_count AS bookmarks,
                COALESCE(s.sessions, 0) AS sessions,
                CASE WHEN COALESCE(s.sessions, 0) = 0 THEN 0::float8
                     ELSE s.completed::float8 / s.sessions::float8 END AS completion_rate,
                COALESCE(s.avg_watch, 0)::float8 AS average_watch_time
            FROM media m
            LEFT JOIN (
                SELECT media_id,
                       COUNT(*) AS sessions,
                       COUNT(*) FILTER (WHERE view_recorded) AS completed,
                       AVG(total_watch_time) AS avg_watch
                FROM playback_sessions
                WHERE media_id = $1
                GROUP BY media_id
            ) s ON s.media_id = m.id
            WHERE m.id = $1
            "#,
        )
        .bind(media_id)
        .fetch_optional(&self.pool)
        .await?;

        analytics.ok_or_else(|| AppError::NotFound("Media not found".to_string()))
    }
}
