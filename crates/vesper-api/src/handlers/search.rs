//! Unified search across hymns, songs, media, prayers and verses

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use vesper_core::models::{PrayerPostResponse, UnifiedSearchQuery, UnifiedSearchResults};

use crate::auth::MaybeUser;
use crate::controller::search_term;
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::ApiResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/search",
    tag = "search",
    params(UnifiedSearchQuery),
    responses(
        (status = 200, description = "Top matches per content type", body = UnifiedSearchResults),
        (status = 400, description = "Missing or too short query", body = ErrorResponse)
    )
)]
pub async fn unified_search(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<UnifiedSearchQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let term = search_term(query.q.as_deref())?;
    let hits = state.content.search.search_all(term, query.limit()).await?;
    let viewer = viewer.map(|v| (v.user_id, v.is_staff()));

    Ok(ApiResponse::ok(UnifiedSearchResults {
        query: term.to_string(),
        hymns: hits.hymns,
        songs: hits.songs,
        media: hits.media,
        prayers: hits
            .prayers
            .into_iter()
            .map(|post| PrayerPostResponse::present(post, viewer))
            .collect(),
        verses: hits.verses,
    }))
}
