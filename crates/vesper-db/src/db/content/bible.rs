use sqlx::{PgPool, Postgres};
use vesper_core::models::{
    BibleBook, BibleTranslation, BibleVerse, PageRequest, Paginated, SortOrder,
};
use vesper_core::AppError;

use crate::db::query::{
    build_text_search, execute_paginated_query, Condition, QueryOptions, SortSpec,
};

const VERSE_COLUMNS: &str = "id, translation, book, book_order, chapter, verse, text";

fn canonical_order() -> SortSpec {
    SortSpec::new("book_order", SortOrder::Asc)
        .then("chapter", SortOrder::Asc)
        .then("verse", SortOrder::Asc)
}

/// Repository for Bible text
#[derive(Clone)]
pub struct BibleRepository {
    pool: PgPool,
}

impl BibleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "bible_verses", db.operation = "aggregate"))]
    pub async fn translations(&self) -> Result<Vec<BibleTranslation>, AppError> {
        let translations = sqlx::query_as::<Postgres, BibleTranslation>(
            r#"
            SELECT translation, COUNT(*) AS verse_count
            FROM bible_verses
            GROUP BY translation
            ORDER BY translation
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(translations)
    }

    #[tracing::instrument(skip(self), fields(db.table = "bible_verses", db.operation = "aggregate"))]
    pub async fn books(&self, translation: &str) -> Result<Vec<BibleBook>, AppError> {
        let books = sqlx::query_as::<Postgres, BibleBook>(
            r#"
            SELECT book, book_order, MAX(chapter) AS chapters
            FROM bible_verses
            WHERE LOWER(translation) = LOWER($1)
            GROUP BY book, book_order
            ORDER BY book_order
            "#,
        )
        .bind(translation)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    #[tracing::instrument(skip(self), fields(db.table = "bible_verses", db.operation = "select"))]
    pub async fn chapter(
        &self,
        translation: &str,
        book: &str,
        chapter: i32,
    ) -> Result<Vec<BibleVerse>, AppError> {
        let verses = sqlx::query_as::<Postgres, BibleVerse>(&format!(
            r#"
            SELECT {}
            FROM bible_verses
            WHERE LOWER(translation) = LOWER($1) AND LOWER(book) = LOWER($2) AND chapter = $3
            ORDER BY verse
            "#,
            VERSE_COLUMNS
        ))
        .bind(translation)
        .bind(book)
        .bind(chapter)
        .fetch_all(&self.pool)
        .await?;
        Ok(verses)
    }

    #[tracing::instrument(skip(self), fields(db.table = "bible_verses", db.operation = "select"))]
    pub async fn verse(
        &self,
        translation: &str,
        book: &str,
        chapter: i32,
        verse: i32,
    ) -> Result<Option<BibleVerse>, AppError> {
        let verse = sqlx::query_as::<Postgres, BibleVerse>(&format!(
            r#"
            SELECT {}
            FROM bible_verses
            WHERE LOWER(translation) = LOWER($1) AND LOWER(book) = LOWER($2)
              AND chapter = $3 AND verse = $4
            "#,
            VERSE_COLUMNS
        ))
        .bind(translation)
        .bind(book)
        .bind(chapter)
        .bind(verse)
        .fetch_optional(&self.pool)
        .await?;
        Ok(verse)
    }

    /// Keyword search over verse text in canonical order.
    #[tracing::instrument(skip(self), fields(db.table = "bible_verses", db.operation = "select"))]
    pub async fn search(
        &self,
        term: &str,
        translation: Option<&str>,
        book: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<BibleVerse>, AppError> {
        let mut conditions = Vec::new();
        if let Some(t) = translation.filter(|t| !t.trim().is_empty()) {
            conditions.push(Condition::eq_ignore_case("translation", t));
        }
        if let Some(b) = book.filter(|b| !b.trim().is_empty()) {
            conditions.push(Condition::eq_ignore_case("book", b));
        }
        conditions.extend(build_text_search(Some(term), &["text"]));

        let opts = QueryOptions {
            sort: canonical_order(),
            page,
        };
        execute_paginated_query(&self.pool, "bible_verses", VERSE_COLUMNS, &conditions, &opts)
            .await
    }
}
