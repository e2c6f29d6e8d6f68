use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const DEFAULT_TRANSLATION: &str = "KJV";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BibleVerse {
    pub id: Uuid,
    pub translation: String,
    pub book: String,
    pub book_order: i32,
    pub chapter: i32,
    pub verse: i32,
    pub text: String,
}

impl BibleVerse {
    /// Human readable reference, e.g. "John 3:16".
    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book, self.chapter, self.verse)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BibleBook {
    pub book: String,
    pub book_order: i32,
    pub chapters: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BibleTranslation {
    pub translation: String,
    pub verse_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BibleChapter {
    pub translation: String,
    pub book: String,
    pub chapter: i32,
    pub verses: Vec<BibleVerse>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct TranslationQuery {
    pub translation: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct BibleSearchQuery {
    pub q: Option<String>,
    pub translation: Option<String>,
    pub book: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct AiSearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

/// One verse suggested by the AI search service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AiVerseResult {
    pub reference: String,
    pub text: String,
    pub relevance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AiSearchSource {
    Ai,
    Keyword,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AiSearchResponse {
    pub query: String,
    pub source: AiSearchSource,
    pub results: Vec<AiVerseResult>,
}
