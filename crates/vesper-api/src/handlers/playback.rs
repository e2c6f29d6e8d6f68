//! Playback session endpoints. The state machine itself lives in the playback service.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::USER_AGENT, HeaderMap},
    response::IntoResponse,
};
use validator::Validate;
use vesper_core::models::{
    EndPlaybackRequest, EndPlaybackResponse, PageRequest, PaginationParams, PlaybackSession,
    ResumePlaybackResponse, StartPlaybackRequest, StartPlaybackResponse, UpdateProgressRequest,
};
use vesper_core::AppError;

use crate::auth::CurrentUser;
use crate::controller::parse_uuid;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::{paginated, ApiResponse};
use crate::state::AppState;

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|ua| ua.chars().take(512).collect())
}

/// The end request body is optional; an empty body uses the default reason.
fn end_request(body: &[u8]) -> Result<EndPlaybackRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(EndPlaybackRequest::default());
    }
    let request: EndPlaybackRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid request body: {}", e)))?;
    request.validate()?;
    Ok(request)
}

#[utoipa::path(
    post,
    path = "/api/v1/playback/start",
    tag = "playback",
    request_body = StartPlaybackRequest,
    responses(
        (status = 201, description = "Session started; any previously active session is paused", body = StartPlaybackResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn start_playback(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<StartPlaybackRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let started = state
        .media
        .playback
        .start(&user, input, user_agent(&headers))
        .await?;
    Ok(ApiResponse::created(started).with_message("Playback started"))
}

#[utoipa::path(
    put,
    path = "/api/v1/playback/{id}/progress",
    tag = "playback",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = UpdateProgressRequest,
    responses(
        (status = 200, description = "Progress saved", body = PlaybackSession),
        (status = 400, description = "Session ended or invalid input", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_progress(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateProgressRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let session = state
        .media
        .playback
        .update_progress(&user, parse_uuid(&id)?, input)
        .await?;
    Ok(ApiResponse::ok(session))
}

#[utoipa::path(
    post,
    path = "/api/v1/playback/{id}/pause",
    tag = "playback",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session paused", body = PlaybackSession),
        (status = 400, description = "Session already ended", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn pause_playback(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let session = state.media.playback.pause(&user, parse_uuid(&id)?).await?;
    Ok(ApiResponse::ok(session).with_message("Playback paused"))
}

#[utoipa::path(
    post,
    path = "/api/v1/playback/{id}/resume",
    tag = "playback",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session resumed; any other active session is paused", body = ResumePlaybackResponse),
        (status = 400, description = "Session already ended", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn resume_playback(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let resumed = state.media.playback.resume(&user, parse_uuid(&id)?).await?;
    Ok(ApiResponse::ok(resumed).with_message("Playback resumed"))
}

#[utoipa::path(
    post,
    path = "/api/v1/playback/{id}/end",
    tag = "playback",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body(content = EndPlaybackRequest, description = "Optional end reason and final position"),
    responses(
        (status = 200, description = "Session ended", body = EndPlaybackResponse),
        (status = 400, description = "Session already ended", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn end_playback(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_uuid(&id)?;
    let request = end_request(&body)?;
    let ended = state.media.playback.end(&user, id, request).await?;
    Ok(ApiResponse::ok(ended).with_message("Playback ended"))
}

#[utoipa::path(
    get,
    path = "/api/v1/playback/active",
    tag = "playback",
    responses(
        (status = 200, description = "The caller's active session, or null", body = PlaybackSession)
    ),
    security(("bearer_auth" = []))
)]
pub async fn active_session(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let session = state.media.playback.active_session(&user).await?;
    Ok(ApiResponse::ok(session))
}

#[utoipa::path(
    get,
    path = "/api/v1/playback/history",
    tag = "playback",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated sessions, newest first")
    ),
    security(("bearer_auth" = []))
)]
pub async fn playback_history(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let history = state
        .media
        .playback
        .history(&user, PageRequest::from(&params))
        .await?;
    Ok(paginated(history))
}
