//! Bible text: translations, books, chapters, verses, keyword and AI search

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use vesper_core::models::{
    AiSearchQuery, AiSearchResponse, AiSearchSource, AiVerseResult, BibleBook, BibleChapter,
    BibleSearchQuery, BibleTranslation, BibleVerse, PageRequest, TranslationQuery,
    DEFAULT_TRANSLATION,
};
use vesper_core::relevance::RelevanceQuery;
use vesper_core::AppError;
use vesper_services::{ai_search, get_or_set, CacheClass, CacheKey};

use crate::controller::{non_blank, search_term};
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::{paginated, ApiResponse};
use crate::state::AppState;

const DEFAULT_AI_RESULTS: i64 = 10;
const MAX_AI_RESULTS: i64 = 50;

fn translation_or_default(query: &TranslationQuery) -> &str {
    non_blank(query.translation.as_deref()).unwrap_or(DEFAULT_TRANSLATION)
}

fn parse_number(raw: &str, name: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| AppError::InvalidInput(format!("{} must be a positive integer", name)))
}

fn chapter_cache_key(translation: &str, book: &str, chapter: i32) -> CacheKey {
    CacheKey::new(
        CacheClass::BibleChapter,
        [translation, book, &chapter.to_string()],
    )
}

/// Keyword hits reshaped as AI results so the fallback has the same wire format.
fn keyword_results(term: &str, verses: Vec<BibleVerse>) -> Vec<AiVerseResult> {
    let scorer = RelevanceQuery::new(term);
    let results = verses
        .into_iter()
        .map(|verse| AiVerseResult {
            relevance: scorer.as_ref().map_or(0.0, |q| q.score(&verse.text, None)),
            reference: verse.reference(),
            text: verse.text,
        })
        .collect();
    ai_search::rank(results, i64::MAX)
}

#[utoipa::path(
    get,
    path = "/api/v1/bible/translations",
    tag = "bible",
    responses(
        (status = 200, description = "Available translations", body = Vec<BibleTranslation>)
    )
)]
pub async fn list_translations(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let translations = state.content.bible.translations().await?;
    Ok(ApiResponse::ok(translations))
}

#[utoipa::path(
    get,
    path = "/api/v1/bible/books",
    tag = "bible",
    params(TranslationQuery),
    responses(
        (status = 200, description = "Books in canonical order", body = Vec<BibleBook>)
    )
)]
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranslationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let books = state
        .content
        .bible
        .books(translation_or_default(&query))
        .await?;
    Ok(ApiResponse::ok(books))
}

#[utoipa::path(
    get,
    path = "/api/v1/bible/{book}/{chapter}",
    tag = "bible",
    params(
        ("book" = String, Path, description = "Book name, e.g. John"),
        ("chapter" = i32, Path, description = "Chapter number"),
        TranslationQuery
    ),
    responses(
        (status = 200, description = "Chapter text", body = BibleChapter),
        (status = 400, description = "Invalid chapter number", body = ErrorResponse),
        (status = 404, description = "Chapter not found", body = ErrorResponse)
    )
)]
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Path((book, chapter)): Path<(String, String)>,
    Query(query): Query<TranslationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let chapter = parse_number(&chapter, "chapter")?;
    let translation = translation_or_default(&query).to_string();
    let key = chapter_cache_key(&translation, &book, chapter);

    let bible = &state.content.bible;
    let (translation, book) = (translation.as_str(), book.as_str());
    let result = get_or_set(state.cache.as_ref(), &key, || async move {
        let verses = bible.chapter(translation, book, chapter).await?;
        let Some(first) = verses.first() else {
            return Err(AppError::NotFound(format!("{} {} not found", book, chapter)));
        };
        Ok(BibleChapter {
            translation: first.translation.clone(),
            book: first.book.clone(),
            chapter,
            verses,
        })
    })
    .await?;
    Ok(ApiResponse::ok(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/bible/{book}/{chapter}/{verse}",
    tag = "bible",
    params(
        ("book" = String, Path, description = "Book name"),
        ("chapter" = i32, Path, description = "Chapter number"),
        ("verse" = i32, Path, description = "Verse number"),
        TranslationQuery
    ),
    responses(
        (status = 200, description = "Verse text", body = BibleVerse),
        (status = 404, description = "Verse not found", body = ErrorResponse)
    )
)]
pub async fn get_verse(
    State(state): State<Arc<AppState>>,
    Path((book, chapter, verse)): Path<(String, String, String)>,
    Query(query): Query<TranslationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let chapter = parse_number(&chapter, "chapter")?;
    let verse = parse_number(&verse, "verse")?;
    let found = state
        .content
        .bible
        .verse(translation_or_default(&query), &book, chapter, verse)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("{} {}:{} not found", book, chapter, verse))
        })?;
    Ok(ApiResponse::ok(found))
}

#[utoipa::path(
    get,
    path = "/api/v1/bible/search",
    tag = "bible",
    params(BibleSearchQuery),
    responses(
        (status = 200, description = "Matching verses in canonical order"),
        (status = 400, description = "Missing or too short query", body = ErrorResponse)
    )
)]
pub async fn search_bible(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BibleSearchQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let term = search_term(query.q.as_deref())?;
    let verses = state
        .content
        .bible
        .search(
            term,
            non_blank(query.translation.as_deref()),
            non_blank(query.book.as_deref()),
            PageRequest::from_query(query.page, query.limit),
        )
        .await?;
    Ok(paginated(verses))
}

/// Semantic search through the external service. Falls back to keyword search when the
/// service errors, and reports which source answered.
#[utoipa::path(
    get,
    path = "/api/v1/bible/ai-search",
    tag = "bible",
    params(AiSearchQuery),
    responses(
        (status = 200, description = "Verses ranked by relevance", body = AiSearchResponse),
        (status = 400, description = "Missing or too short query", body = ErrorResponse),
        (status = 503, description = "AI search is not configured", body = ErrorResponse)
    )
)]
pub async fn ai_search_bible(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AiSearchQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let term = search_term(query.q.as_deref())?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_AI_RESULTS)
        .clamp(1, MAX_AI_RESULTS);
    let provider = state.content.ai_search.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("AI search is not configured".to_string())
    })?;

    let (source, results) = match provider.search_verses(term, limit).await {
        Ok(results) => (AiSearchSource::Ai, results),
        Err(e) => {
            tracing::warn!(error = %e, query = %term, "AI search failed, using keyword search");
            let verses = state
                .content
                .bible
                .search(term, None, None, PageRequest::from_query(Some(1), Some(limit)))
                .await?;
            (AiSearchSource::Keyword, keyword_results(term, verses.data))
        }
    };

    Ok(ApiResponse::ok(AiSearchResponse {
        query: term.to_string(),
        source,
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn verse(book: &str, chapter: i32, number: i32, text: &str) -> BibleVerse {
        BibleVerse {
            id: Uuid::new_v4(),
            translation: "KJV".to_string(),
            book: book.to_string(),
            book_order: 43,
            chapter,
            verse: number,
            text: text.to_string(),
        }
    }

    #[test]
    fn chapter_numbers_must_be_positive() {
        assert_eq!(parse_number("3", "chapter").unwrap(), 3);
        assert!(parse_number("0", "chapter").is_err());
        assert!(parse_number("three", "chapter").is_err());
    }

    #[test]
    fn chapter_keys_ignore_case() {
        assert_eq!(
            chapter_cache_key("KJV", "John", 3),
            chapter_cache_key("kjv", "john", 3)
        );
        assert_ne!(
            chapter_cache_key("KJV", "John", 3),
            chapter_cache_key("KJV", "John", 4)
        );
    }

    #[test]
    fn keyword_fallback_is_ranked() {
        let results = keyword_results(
            "love",
            vec![
                verse("John", 15, 13, "Greater love hath no man than this"),
                verse("John", 3, 17, "For God sent not his Son"),
            ],
        );
        assert_eq!(results[0].reference, "John 15:13");
        assert!(results[0].relevance > results[1].relevance);
    }

    #[test]
    fn missing_translation_uses_default() {
        assert_eq!(translation_or_default(&TranslationQuery::default()), "KJV");
    }
}
