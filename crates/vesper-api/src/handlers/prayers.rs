//! Prayer wall: posts, "I prayed" support and relevance search

use std::cmp::Ordering;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use vesper_core::models::{
    AuthUser, CreatePrayerRequest, PageRequest, Paginated, PrayerListQuery, PrayerPost,
    PrayerPostResponse, PrayerSearchQuery, SortOrder, UpdatePrayerRequest,
};
use vesper_core::relevance::RelevanceQuery;
use vesper_core::AppError;
use vesper_db::{ColumnValues, ResourceTable};
use vesper_services::OutboundEvent;

use crate::auth::{CurrentUser, MaybeUser};
use crate::controller::{parse_uuid, search_term, set_if_present, Resource};
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::{message, paginated, ApiResponse};
use crate::state::AppState;

pub struct PrayerPosts;

impl ResourceTable for PrayerPosts {
    type Record = PrayerPost;

    const TABLE: &'static str = "prayer_posts";
    const COLUMNS: &'static str = "id, author_id, content, scripture_reference, is_anonymous, \
        prayer_count, is_deleted, deleted_at, created_at, updated_at";
    const SEARCHABLE: &'static [&'static str] = &["content", "scripture_reference"];
    const SORTABLE: &'static [&'static str] = &["created_at", "prayer_count"];
    const DEFAULT_SORT: &'static str = "created_at";
    const DEFAULT_ORDER: SortOrder = SortOrder::Desc;
    const SOFT_DELETE: bool = true;
    const TRACKS_UPDATES: bool = true;
}

fn viewer_identity(viewer: Option<&AuthUser>) -> Option<(Uuid, bool)> {
    viewer.map(|v| (v.user_id, v.is_staff()))
}

impl Resource for PrayerPosts {
    const NAME: &'static str = "Prayer";

    type Create = CreatePrayerRequest;
    type Update = UpdatePrayerRequest;
    type Query = PrayerListQuery;
    type Output = PrayerPostResponse;

    fn owner_of(record: &PrayerPost) -> Option<Uuid> {
        Some(record.author_id)
    }

    fn present(record: PrayerPost, viewer: Option<&AuthUser>) -> PrayerPostResponse {
        PrayerPostResponse::present(record, viewer_identity(viewer))
    }

    fn before_save(input: CreatePrayerRequest, user: &AuthUser) -> Result<ColumnValues, AppError> {
        Ok(vec![
            ("author_id", user.user_id.into()),
            ("content", input.content.into()),
            ("scripture_reference", input.scripture_reference.into()),
            ("is_anonymous", input.is_anonymous.into()),
        ])
    }

    fn before_update(
        input: UpdatePrayerRequest,
        _existing: &PrayerPost,
        _user: &AuthUser,
    ) -> Result<ColumnValues, AppError> {
        let mut values = ColumnValues::new();
        set_if_present(&mut values, "content", input.content);
        set_if_present(&mut values, "scripture_reference", input.scripture_reference);
        set_if_present(&mut values, "is_anonymous", input.is_anonymous);
        Ok(values)
    }
}

/// Score every candidate and order by score, then newest first. Zero-score candidates are dropped.
fn rank(query: &RelevanceQuery, candidates: Vec<PrayerPost>) -> Vec<(PrayerPost, f64)> {
    let mut scored: Vec<(PrayerPost, f64)> = candidates
        .into_iter()
        .map(|post| {
            let score = query.score(&post.content, post.scripture_reference.as_deref());
            (post, score)
        })
        .filter(|(_, score)| *score > 0.0)
        .collect();
    scored.sort_by(|(a, sa), (b, sb)| {
        sb.partial_cmp(sa)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    scored
}

#[utoipa::path(
    get,
    path = "/api/v1/prayers",
    tag = "prayers",
    params(PrayerListQuery),
    responses(
        (status = 200, description = "Paginated prayer posts"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_prayers(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<PrayerListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state
        .resource::<PrayerPosts>()
        .get_list(&query, viewer.as_ref())
        .await?;
    Ok(paginated(page))
}

/// Relevance-ranked search. Every matching post is loaded and scored, then the requested page
/// is sliced out of the ranked list.
#[utoipa::path(
    get,
    path = "/api/v1/prayers/search",
    tag = "prayers",
    params(PrayerSearchQuery),
    responses(
        (status = 200, description = "Ranked prayer posts with relevance scores"),
        (status = 400, description = "Missing or too short query", body = ErrorResponse)
    )
)]
pub async fn search_prayers(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<PrayerSearchQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let term = search_term(query.q.as_deref())?;
    let relevance = RelevanceQuery::new(term)
        .ok_or_else(|| AppError::InvalidInput("q must not be blank".to_string()))?;
    let page = PageRequest::from_query(query.page, query.limit);

    let candidates = state
        .community
        .prayers
        .search_candidates(relevance.words())
        .await?;
    tracing::debug!(candidates = candidates.len(), "Scoring prayer search candidates");

    let viewer = viewer_identity(viewer.as_ref());
    let results: Paginated<PrayerPostResponse> =
        Paginated::from_vec(rank(&relevance, candidates), page).map(|(post, score)| {
            PrayerPostResponse {
                relevance: Some(score),
                ..PrayerPostResponse::present(post, viewer)
            }
        });
    Ok(paginated(results))
}

#[utoipa::path(
    get,
    path = "/api/v1/prayers/{id}",
    tag = "prayers",
    params(("id" = Uuid, Path, description = "Prayer ID")),
    responses(
        (status = 200, description = "Prayer found", body = PrayerPostResponse),
        (status = 404, description = "Prayer not found", body = ErrorResponse)
    )
)]
pub async fn get_prayer(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let prayer = state
        .resource::<PrayerPosts>()
        .get_by_id(&id, viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(prayer))
}

#[utoipa::path(
    post,
    path = "/api/v1/prayers",
    tag = "prayers",
    request_body = CreatePrayerRequest,
    responses(
        (status = 201, description = "Prayer posted", body = PrayerPostResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_prayer(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreatePrayerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let prayer = state
        .resource::<PrayerPosts>()
        .create(&state, input, &user)
        .await?;
    Ok(ApiResponse::created(prayer).with_message("Prayer posted"))
}

#[utoipa::path(
    put,
    path = "/api/v1/prayers/{id}",
    tag = "prayers",
    params(("id" = Uuid, Path, description = "Prayer ID")),
    request_body = UpdatePrayerRequest,
    responses(
        (status = 200, description = "Prayer updated", body = PrayerPostResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Prayer not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_prayer(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePrayerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let prayer = state
        .resource::<PrayerPosts>()
        .update(&state, &id, input, &user)
        .await?;
    Ok(ApiResponse::ok(prayer).with_message("Prayer updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/prayers/{id}",
    tag = "prayers",
    params(("id" = Uuid, Path, description = "Prayer ID")),
    responses(
        (status = 200, description = "Prayer deleted"),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Prayer not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_prayer(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = state
        .resource::<PrayerPosts>()
        .delete(&state, &id, &user)
        .await?;
    Ok(message(id, "Prayer deleted"))
}

#[utoipa::path(
    post,
    path = "/api/v1/prayers/{id}/pray",
    tag = "prayers",
    params(("id" = Uuid, Path, description = "Prayer ID")),
    responses(
        (status = 200, description = "Prayer count incremented", body = PrayerPostResponse),
        (status = 404, description = "Prayer not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn pray(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_uuid(&id)?;
    let post = state
        .community
        .prayers
        .increment_prayer_count(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Prayer not found".to_string()))?;

    state.events.publish(OutboundEvent::PrayerSupported {
        prayer_id: post.id,
        author_id: post.author_id,
        supporter_id: user.user_id,
        prayer_count: post.prayer_count,
    });

    Ok(ApiResponse::ok(PrayerPostResponse::present(
        post,
        viewer_identity(Some(&user)),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn post(content: &str, reference: Option<&str>, age_minutes: i64) -> PrayerPost {
        let created = Utc::now() - Duration::minutes(age_minutes);
        PrayerPost {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            content: content.to_string(),
            scripture_reference: reference.map(String::from),
            is_anonymous: false,
            prayer_count: 0,
            is_deleted: false,
            deleted_at: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn ranks_by_score_then_newest() {
        let query = RelevanceQuery::new("healing").unwrap();
        let older = post("Pray for healing", None, 60);
        let newer = post("Pray for healing", None, 5);
        let best = post("healing", Some("James 5 healing"), 120);
        let ranked = rank(&query, vec![older.clone(), newer.clone(), best.clone()]);
        let ids: Vec<Uuid> = ranked.iter().map(|(p, _)| p.id).collect();
        assert_eq!(ids, vec![best.id, newer.id, older.id]);
        assert!(ranked.iter().all(|(_, s)| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn zero_score_candidates_are_dropped() {
        let query = RelevanceQuery::new("grace").unwrap();
        let ranked = rank(&query, vec![post("Sunny weather today", None, 1)]);
        assert!(ranked.is_empty());
    }
}
