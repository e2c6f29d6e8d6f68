use sqlx::{PgPool, Postgres};
use vesper_core::models::{BibleVerse, Hymn, Media, PrayerPost, Song};
use vesper_core::AppError;

use crate::db::media::MEDIA_COLUMNS;
use crate::db::query::escape_like;

/// Results of a cross-content search before presentation.
#[derive(Debug, Default)]
pub struct SearchHits {
    pub hymns: Vec<Hymn>,
    pub songs: Vec<Song>,
    pub media: Vec<Media>,
    pub prayers: Vec<PrayerPost>,
    pub verses: Vec<BibleVerse>,
}

/// Unified search across content types
#[derive(Clone)]
pub struct SearchRepository {
    pool: PgPool,
}

impl SearchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hymns(&self, pattern: &str, limit: i64) -> Result<Vec<Hymn>, sqlx::Error> {
        sqlx::query_as::<Postgres, Hymn>(
            r#"
            SELECT id, number, title, author, category, lyrics, tune, created_at
            FROM hymns
            WHERE title ILIKE $1 OR author ILIKE $1 OR lyrics ILIKE $1
            ORDER BY (title ILIKE $1) DESC, title
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn songs(&self, pattern: &str, limit: i64) -> Result<Vec<Song>, sqlx::Error> {
        sqlx::query_as::<Postgres, Song>(
            r#"
            SELECT id, title, artist, genre, license, audio_url, duration_seconds,
                   download_count, created_at
            FROM songs
            WHERE title ILIKE $1 OR artist ILIKE $1 OR genre ILIKE $1
            ORDER BY download_count DESC, title
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn media(&self, pattern: &str, limit: i64) -> Result<Vec<Media>, sqlx::Error> {
        sqlx::query_as::<Postgres, Media>(&format!(
            r#"
            SELECT {}
            FROM media
            WHERE is_deleted = false AND moderation_status = 'active'
              AND (title ILIKE $1 OR description ILIKE $1 OR category ILIKE $1)
            ORDER BY view_count DESC, created_at DESC
            LIMIT $2
            "#,
            MEDIA_COLUMNS
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn prayers(&self, pattern: &str, limit: i64) -> Result<Vec<PrayerPost>, sqlx::Error> {
        sqlx::query_as::<Postgres, PrayerPost>(
            r#"
            SELECT id, author_id, content, scripture_reference, is_anonymous, prayer_count,
                   is_deleted, deleted_at, created_at, updated_at
            FROM prayer_posts
            WHERE is_deleted = false
              AND (content ILIKE $1 OR scripture_reference ILIKE $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn verses(&self, pattern: &str, limit: i64) -> Result<Vec<BibleVerse>, sqlx::Error> {
        sqlx::query_as::<Postgres, BibleVerse>(
            r#"
            SELECT id, translation, book, book_order, chapter, verse, text
            FROM bible_verses
            WHERE text ILIKE $1
            ORDER BY book_order, chapter, verse
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Top `limit` matches per content type, queried concurrently.
    #[tracing::instrument(skip(self), fields(db.operation = "search"))]
    pub async fn search_all(&self, term: &str, limit: i64) -> Result<SearchHits, AppError> {
        let pattern = format!("%{}%", escape_like(term.trim()));
        let (hymns, songs, media, prayers, verses) = tokio::try_join!(
            self.hymns(&pattern, limit),
            self.songs(&pattern, limit),
            self.media(&pattern, limit),
            self.prayers(&pattern, limit),
            self.verses(&pattern, limit),
        )?;
        Ok(SearchHits {
            hymns,
            songs,
            media,
            prayers,
            verses,
        })
    }
}
