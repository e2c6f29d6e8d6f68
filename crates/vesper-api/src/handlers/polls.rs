//! Community polls with live tallies

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use futures::future::try_join_all;
use uuid::Uuid;
use vesper_core::models::{
    AuthUser, CreatePollRequest, PageRequest, Paginated, Poll, PollListQuery, PollWithResults,
    VoteRequest,
};
use vesper_core::AppError;
use vesper_services::OutboundEvent;

use crate::auth::{CurrentUser, MaybeUser};
use crate::controller::{parse_uuid, Access};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::{paginated, ApiResponse};
use crate::state::AppState;

async fn find_poll(state: &AppState, id: Uuid) -> Result<Poll, AppError> {
    state
        .community
        .polls
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))
}

async fn with_results(
    state: &AppState,
    poll: Poll,
    viewer: Option<&AuthUser>,
) -> Result<PollWithResults, AppError> {
    let polls = &state.community.polls;
    let counts = polls.tallies(poll.id).await?;
    let user_vote = match viewer {
        Some(user) => polls.user_vote(poll.id, user.user_id).await?,
        None => None,
    };
    Ok(PollWithResults::from_counts(poll, &counts, user_vote))
}

/// Reject votes on closed polls and option indexes the poll does not have.
fn check_vote(poll: &Poll, option_index: i32) -> Result<(), AppError> {
    if !poll.is_open_at(Utc::now()) {
        return Err(AppError::InvalidInput("Poll is closed".to_string()));
    }
    let in_range = usize::try_from(option_index).is_ok_and(|i| i < poll.options.len());
    if !in_range {
        return Err(AppError::InvalidInput(format!(
            "option_index must be between 0 and {}",
            poll.options.len().saturating_sub(1)
        )));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/polls",
    tag = "polls",
    params(PollListQuery),
    responses(
        (status = 200, description = "Paginated polls with results"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_polls(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<PollListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = PageRequest::from_query(query.page, query.limit);
    let mut polls = state
        .community
        .polls
        .list(query.open.unwrap_or(false), page)
        .await?;

    let items = std::mem::take(&mut polls.data);
    let results =
        try_join_all(items.into_iter().map(|poll| with_results(&state, poll, viewer.as_ref())))
            .await?;
    Ok(paginated(Paginated {
        data: results,
        page: polls.page,
        limit: polls.limit,
        total: polls.total,
        pages: polls.pages,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/polls/{id}",
    tag = "polls",
    params(("id" = Uuid, Path, description = "Poll ID")),
    responses(
        (status = 200, description = "Poll with results", body = PollWithResults),
        (status = 404, description = "Poll not found", body = ErrorResponse)
    )
)]
pub async fn get_poll(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let poll = find_poll(&state, parse_uuid(&id)?).await?;
    Ok(ApiResponse::ok(with_results(&state, poll, viewer.as_ref()).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/polls",
    tag = "polls",
    request_body = CreatePollRequest,
    responses(
        (status = 201, description = "Poll created", body = PollWithResults),
        (status = 400, description = "Invalid options", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_poll(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(input): ValidatedJson<CreatePollRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if let Some(closes_at) = input.closes_at {
        if closes_at <= Utc::now() {
            return Err(AppError::InvalidInput("closes_at must be in the future".to_string()).into());
        }
    }
    let options: Vec<String> = input.options.iter().map(|o| o.trim().to_string()).collect();
    let poll = state
        .community
        .polls
        .create(user.user_id, input.question.trim(), &options, input.closes_at)
        .await?;
    tracing::info!(poll_id = %poll.id, user_id = %user.user_id, options = options.len(), "Poll created");

    let created = PollWithResults::from_counts(poll, &[], None);
    Ok(ApiResponse::created(created).with_message("Poll created"))
}

#[utoipa::path(
    post,
    path = "/api/v1/polls/{id}/vote",
    tag = "polls",
    params(("id" = Uuid, Path, description = "Poll ID")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = PollWithResults),
        (status = 400, description = "Poll closed, bad option or already voted", body = ErrorResponse),
        (status = 404, description = "Poll not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn vote(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<VoteRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let poll = find_poll(&state, parse_uuid(&id)?).await?;
    check_vote(&poll, input.option_index)?;

    state
        .community
        .polls
        .vote(poll.id, user.user_id, input.option_index)
        .await?;
    state.events.publish(OutboundEvent::PollVoteCast {
        poll_id: poll.id,
        option_index: input.option_index,
    });

    let results = with_results(&state, poll, Some(&user)).await?;
    Ok(ApiResponse::ok(results).with_message("Vote recorded"))
}

#[utoipa::path(
    post,
    path = "/api/v1/polls/{id}/close",
    tag = "polls",
    params(("id" = Uuid, Path, description = "Poll ID")),
    responses(
        (status = 200, description = "Poll closed", body = PollWithResults),
        (status = 403, description = "Not the poll creator", body = ErrorResponse),
        (status = 404, description = "Poll not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn close_poll(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let poll = find_poll(&state, parse_uuid(&id)?).await?;
    Access::OwnerOrStaff.authorize(&user, Some(poll.creator_id))?;

    let closed = state
        .community
        .polls
        .close(poll.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))?;
    let results = with_results(&state, closed, Some(&user)).await?;
    Ok(ApiResponse::ok(results).with_message("Poll closed"))
}
