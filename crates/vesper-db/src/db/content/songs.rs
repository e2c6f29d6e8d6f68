use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vesper_core::models::SongDownload;
use vesper_core::AppError;

/// Song operations beyond plain CRUD
#[derive(Clone)]
pub struct SongRepository {
    pool: PgPool,
}

impl SongRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "songs", db.operation = "update", db.record_id = %id))]
    pub async fn record_download(&self, id: Uuid) -> Result<Option<SongDownload>, AppError> {
        let download = sqlx::query_as::<Postgres, SongDownload>(
            r#"
            UPDATE songs SET download_count = download_count + 1
            WHERE id = $1
            RETURNING id, audio_url, download_count
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(download)
    }
}
