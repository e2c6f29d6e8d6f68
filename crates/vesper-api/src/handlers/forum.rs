//! Forum posts, likes and replies

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use vesper_core::models::{
    AuthUser, CreateForumPostRequest, CreateForumReplyRequest, ForumListQuery, ForumPost,
    ForumReply, PageRequest, PaginationParams, SortOrder, ToggleResult, UpdateForumPostRequest,
};
use vesper_core::AppError;
use vesper_db::{ColumnValues, Condition, ResourceTable};
use vesper_services::OutboundEvent;

use crate::auth::{CurrentUser, MaybeUser};
use crate::controller::{non_blank, parse_uuid, set_if_present, Resource};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::{message, paginated, ApiResponse};
use crate::state::AppState;

pub struct ForumPosts;

impl ResourceTable for ForumPosts {
    type Record = ForumPost;

    const TABLE: &'static str = "forum_posts";
    const COLUMNS: &'static str = "id, author_id, title, content, category, like_count, \
        reply_count, is_deleted, deleted_at, created_at, updated_at";
    const SEARCHABLE: &'static [&'static str] = &["title", "content"];
    const SORTABLE: &'static [&'static str] =
        &["created_at", "updated_at", "like_count", "reply_count", "title"];
    const DEFAULT_SORT: &'static str = "created_at";
    const DEFAULT_ORDER: SortOrder = SortOrder::Desc;
    const SOFT_DELETE: bool = true;
    const TRACKS_UPDATES: bool = true;
}

impl Resource for ForumPosts {
    const NAME: &'static str = "Forum post";

    type Create = CreateForumPostRequest;
    type Update = UpdateForumPostRequest;
    type Query = ForumListQuery;
    type Output = ForumPost;

    fn filters_from_query(
        query: &ForumListQuery,
        _viewer: Option<&AuthUser>,
    ) -> Result<Vec<Condition>, AppError> {
        Ok(non_blank(query.category.as_deref())
            .map(|category| Condition::eq("category", category))
            .into_iter()
            .collect())
    }

    fn owner_of(record: &ForumPost) -> Option<Uuid> {
        Some(record.author_id)
    }

    fn present(record: ForumPost, _viewer: Option<&AuthUser>) -> ForumPost {
        record
    }

    fn before_save(
        input: CreateForumPostRequest,
        user: &AuthUser,
    ) -> Result<ColumnValues, AppError> {
        Ok(vec![
            ("author_id", user.user_id.into()),
            ("title", input.title.trim().into()),
            ("content", input.content.into()),
            ("category", input.category.into()),
        ])
    }

    fn before_update(
        input: UpdateForumPostRequest,
        _existing: &ForumPost,
        _user: &AuthUser,
    ) -> Result<ColumnValues, AppError> {
        let mut values = ColumnValues::new();
        set_if_present(&mut values, "title", input.title.map(|t| t.trim().to_string()));
        set_if_present(&mut values, "content", input.content);
        set_if_present(&mut values, "category", input.category);
        Ok(values)
    }
}

async fn ensure_post(state: &AppState, post_id: Uuid) -> Result<(), AppError> {
    if state.community.forum.post_exists(post_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("Forum post not found".to_string()))
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/forums",
    tag = "forum",
    params(ForumListQuery),
    responses(
        (status = 200, description = "Paginated forum posts"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<ForumListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state
        .resource::<ForumPosts>()
        .get_list(&query, viewer.as_ref())
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/forums/{id}",
    tag = "forum",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post found", body = ForumPost),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let post = state
        .resource::<ForumPosts>()
        .get_by_id(&id, viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(post))
}

#[utoipa::path(
    post,
    path = "/api/v1/forums",
    tag = "forum",
    request_body = CreateForumPostRequest,
    responses(
        (status = 201, description = "Post created", body = ForumPost),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateForumPostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let post = state
        .resource::<ForumPosts>()
        .create(&state, input, &user)
        .await?;
    Ok(ApiResponse::created(post).with_message("Post created"))
}

#[utoipa::path(
    put,
    path = "/api/v1/forums/{id}",
    tag = "forum",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdateForumPostRequest,
    responses(
        (status = 200, description = "Post updated", body = ForumPost),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateForumPostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let post = state
        .resource::<ForumPosts>()
        .update(&state, &id, input, &user)
        .await?;
    Ok(ApiResponse::ok(post).with_message("Post updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/forums/{id}",
    tag = "forum",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = state
        .resource::<ForumPosts>()
        .delete(&state, &id, &user)
        .await?;
    Ok(message(id, "Post deleted"))
}

#[utoipa::path(
    post,
    path = "/api/v1/forums/{id}/like",
    tag = "forum",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Like toggled", body = ToggleResult),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let post_id = parse_uuid(&id)?;
    ensure_post(&state, post_id).await?;
    let result = state
        .community
        .forum
        .toggle_like(user.user_id, post_id)
        .await?;
    Ok(ApiResponse::ok(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/forums/{id}/replies",
    tag = "forum",
    params(("id" = Uuid, Path, description = "Post ID"), PaginationParams),
    responses(
        (status = 200, description = "Replies, oldest first"),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
pub async fn list_replies(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let post_id = parse_uuid(&id)?;
    ensure_post(&state, post_id).await?;
    let replies = state
        .community
        .forum
        .list_replies(post_id, PageRequest::from(&params))
        .await?;
    Ok(paginated(replies))
}

#[utoipa::path(
    post,
    path = "/api/v1/forums/{id}/replies",
    tag = "forum",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreateForumReplyRequest,
    responses(
        (status = 201, description = "Reply posted", body = ForumReply),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_reply(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<CreateForumReplyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let post_id = parse_uuid(&id)?;
    let posted = state
        .community
        .forum
        .create_reply(post_id, user.user_id, input.content.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Forum post not found".to_string()))?;

    state.events.publish(OutboundEvent::ReplyPosted {
        post_id,
        post_title: posted.post_title,
        post_author_id: posted.post_author_id,
        reply_id: posted.reply.id,
        replier_id: user.user_id,
    });

    Ok(ApiResponse::created(posted.reply).with_message("Reply posted"))
}
