use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vesper_core::models::{
    FiledReport, Media, MediaReport, ModerationStatus, PageRequest, Paginated, ReportReason,
    ReportStatus, SortOrder,
};
use vesper_core::AppError;

use super::MEDIA_COLUMNS;
use crate::db::query::{execute_paginated_query, Condition, QueryOptions, SortSpec, SqlValue};

const REPORT_COLUMNS: &str =
    "id, media_id, reporter_id, reason, details, status, reviewed_by, reviewed_at, created_at";

/// Storage operations behind the moderation service
#[async_trait::async_trait]
pub trait ReportStore: Send + Sync {
    async fn find_media(&self, media_id: Uuid) -> Result<Option<Media>, AppError>;

    async fn has_reported(&self, media_id: Uuid, reporter_id: Uuid) -> Result<bool, AppError>;

    /// Insert the report and increment `media.report_count` in one transaction. A second
    /// report by the same user fails with [`AppError::Conflict`].
    async fn file_report(
        &self,
        media_id: Uuid,
        reporter_id: Uuid,
        reason: ReportReason,
        details: Option<String>,
    ) -> Result<FiledReport, AppError>;

    /// Move media to `status` only if it is currently `from`. Returns whether it changed.
    async fn transition_media_status(
        &self,
        media_id: Uuid,
        from: ModerationStatus,
        to: ModerationStatus,
    ) -> Result<bool, AppError>;

    async fn set_media_status(
        &self,
        media_id: Uuid,
        status: ModerationStatus,
    ) -> Result<bool, AppError>;

    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<Paginated<MediaReport>, AppError>;

    async fn find_report(&self, id: Uuid) -> Result<Option<MediaReport>, AppError>;

    async fn review_report(
        &self,
        id: Uuid,
        status: ReportStatus,
        reviewer_id: Uuid,
    ) -> Result<Option<MediaReport>, AppError>;
}

/// Repository for media reports
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReportStore for ReportRepository {
    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %media_id))]
    async fn find_media(&self, media_id: Uuid) -> Result<Option<Media>, AppError> {
        let media = sqlx::query_as::<Postgres, Media>(&format!(
            "SELECT {} FROM media WHERE id = $1 AND is_deleted = false",
            MEDIA_COLUMNS
        ))
        .bind(media_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(media)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_reports", db.operation = "select"))]
    async fn has_reported(&self, media_id: Uuid, reporter_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM media_reports WHERE media_id = $1 AND reporter_id = $2)",
        )
        .bind(media_id)
        .bind(reporter_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    #[tracing::instrument(skip(self, details), fields(db.table = "media_reports", db.operation = "insert"))]
    async fn file_report(
        &self,
        media_id: Uuid,
        reporter_id: Uuid,
        reason: ReportReason,
        details: Option<String>,
    ) -> Result<FiledReport, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<Postgres, MediaReport>(&format!(
            r#"
            INSERT INTO media_reports (media_id, reporter_id, reason, details)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(media_id)
        .bind(reporter_id)
        .bind(reason)
        .bind(&details)
        .fetch_one(&mut *tx)
        .await;

        let report = match inserted {
            Ok(report) => report,
            Err(e) => {
                let err = AppError::from(e);
                return Err(if err.is_unique_violation() {
                    AppError::Conflict("You have already reported this media".to_string())
                } else {
                    err
                });
            }
        };

        let report_count = sqlx::query_scalar::<Postgres, i32>(
            "UPDATE media SET report_count = report_count + 1 WHERE id = $1 RETURNING report_count",
        )
        .bind(media_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(FiledReport {
            report,
            report_count,
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "update", db.record_id = %media_id))]
    async fn transition_media_status(
        &self,
        media_id: Uuid,
        from: ModerationStatus,
        to: ModerationStatus,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE media SET moderation_status = $3, updated_at = NOW() WHERE id = $1 AND moderation_status = $2",
        )
        .bind(media_id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "update", db.record_id = %media_id))]
    async fn set_media_status(
        &self,
        media_id: Uuid,
        status: ModerationStatus,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE media SET moderation_status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(media_id)
        .bind(status)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_reports", db.operation = "select"))]
    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<Paginated<MediaReport>, AppError> {
        let conditions: Vec<Condition> = status
            .map(|s| {
                Condition::eq(
                    "status",
                    SqlValue::enumeration("report_status", s.as_str()),
                )
            })
            .into_iter()
            .collect();
        let opts = QueryOptions {
            sort: SortSpec::new("created_at", SortOrder::Desc),
            page,
        };
        execute_paginated_query(&self.pool, "media_reports", REPORT_COLUMNS, &conditions, &opts)
            .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_reports", db.operation = "select", db.record_id = %id))]
    async fn find_report(&self, id: Uuid) -> Result<Option<MediaReport>, AppError> {
        let report = sqlx::query_as::<Postgres, MediaReport>(&format!(
            "SELECT {} FROM media_reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(report)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media_reports", db.operation = "update", db.record_id = %id))]
    async fn review_report(
        &self,
        id: Uuid,
        status: ReportStatus,
        reviewer_id: Uuid,
    ) -> Result<Option<MediaReport>, AppError> {
        let report = sqlx::query_as::<Postgres, MediaReport>(&format!(
            r#"
            UPDATE media_reports
            SET status = $2, reviewed_by = $3, reviewed_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .bind(reviewer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(report)
    }
}
