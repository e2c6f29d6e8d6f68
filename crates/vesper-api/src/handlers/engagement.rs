//! Bookmarks and likes on media

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use vesper_core::models::{PageRequest, PaginationParams, ToggleResult};

use crate::auth::CurrentUser;
use crate::controller::parse_uuid;
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::{message, paginated, ApiResponse};
use crate::state::AppState;

fn toggle_message(active: bool, on: &'static str, off: &'static str) -> &'static str {
    if active {
        on
    } else {
        off
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/media/{id}/bookmark",
    tag = "engagement",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Bookmark toggled", body = ToggleResult),
        (status = 404, description = "Media not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn toggle_bookmark(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let media_id = parse_uuid(&id)?;
    let result = state
        .media
        .engagement
        .toggle_bookmark(&user, media_id)
        .await?;
    let msg = toggle_message(result.active, "Bookmarked", "Bookmark removed");
    Ok(ApiResponse::ok(result).with_message(msg))
}

#[utoipa::path(
    post,
    path = "/api/v1/media/{id}/like",
    tag = "engagement",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Like toggled", body = ToggleResult),
        (status = 404, description = "Media not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let media_id = parse_uuid(&id)?;
    let result = state.media.engagement.toggle_like(&user, media_id).await?;
    let msg = toggle_message(result.active, "Liked", "Like removed");
    Ok(ApiResponse::ok(result).with_message(msg))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookmarks",
    tag = "engagement",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated bookmarks with media summaries"),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let bookmarks = state
        .media
        .engagement
        .bookmarks(&user, PageRequest::from(&params))
        .await?;
    Ok(paginated(bookmarks))
}

#[utoipa::path(
    delete,
    path = "/api/v1/bookmarks/{id}",
    tag = "engagement",
    params(("id" = Uuid, Path, description = "Bookmark ID")),
    responses(
        (status = 200, description = "Bookmark removed"),
        (status = 403, description = "Not your bookmark", body = ErrorResponse),
        (status = 404, description = "Bookmark not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_bookmark(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_uuid(&id)?;
    state.media.engagement.remove_bookmark(&user, id).await?;
    Ok(message(id, "Bookmark removed"))
}
