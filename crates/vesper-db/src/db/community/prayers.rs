use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vesper_core::models::PrayerPost;
use vesper_core::AppError;

use crate::db::query::escape_like;

const PRAYER_COLUMNS: &str = "id, author_id, content, scripture_reference, is_anonymous, \
    prayer_count, is_deleted, deleted_at, created_at, updated_at";

/// Prayer post queries that do not fit the generic resource store
#[derive(Clone)]
pub struct PrayerRepository {
    pool: PgPool,
}

impl PrayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every live post whose content or scripture reference contains any of `words`.
    /// Ranking happens in the caller.
    #[tracing::instrument(skip(self), fields(db.table = "prayer_posts", db.operation = "select"))]
    pub async fn search_candidates(&self, words: &[String]) -> Result<Vec<PrayerPost>, AppError> {
        if words.is_empty() {
            return Ok(Vec::new());
        }
        let patterns: Vec<String> = words
            .iter()
            .map(|w| format!("%{}%", escape_like(w)))
            .collect();
        let posts = sqlx::query_as::<Postgres, PrayerPost>(&format!(
            r#"
            SELECT {}
            FROM prayer_posts
            WHERE is_deleted = false
              AND (content ILIKE ANY($1) OR scripture_reference ILIKE ANY($1))
            "#,
            PRAYER_COLUMNS
        ))
        .bind(&patterns)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    /// Returns the new count, or `None` if the post does not exist.
    #[tracing::instrument(skip(self), fields(db.table = "prayer_posts", db.operation = "update", db.record_id = %id))]
    pub async fn increment_prayer_count(&self, id: Uuid) -> Result<Option<PrayerPost>, AppError> {
        let post = sqlx::query_as::<Postgres, PrayerPost>(&format!(
            r#"
            UPDATE prayer_posts SET prayer_count = prayer_count + 1
            WHERE id = $1 AND is_deleted = false
            RETURNING {}
            "#,
            PRAYER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }
}
