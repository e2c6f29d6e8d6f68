//! In-app notifications for the signed-in user

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use vesper_core::models::{
    AuthUser, Notification, NotificationListQuery, PageRequest, UnreadCount,
};
use vesper_core::AppError;

use crate::auth::CurrentUser;
use crate::controller::parse_uuid;
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::{message, paginated, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkedRead {
    pub updated: u64,
}

/// Load a notification and make sure it belongs to the caller.
async fn owned_notification(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> Result<Notification, AppError> {
    let notification = state
        .community
        .notifications
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;
    if notification.user_id != user.user_id {
        return Err(AppError::Forbidden(
            "You can only manage your own notifications".to_string(),
        ));
    }
    Ok(notification)
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "notifications",
    params(NotificationListQuery),
    responses(
        (status = 200, description = "Paginated notifications, newest first"),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = PageRequest::from_query(query.page, query.limit);
    let notifications = state
        .community
        .notifications
        .list(user.user_id, query.unread_only, page)
        .await?;
    Ok(paginated(notifications))
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    tag = "notifications",
    responses(
        (status = 200, description = "Unread notification count", body = UnreadCount)
    ),
    security(("bearer_auth" = []))
)]
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let unread = state
        .community
        .notifications
        .unread_count(user.user_id)
        .await?;
    Ok(ApiResponse::ok(UnreadCount { unread }))
}

#[utoipa::path(
    patch,
    path = "/api/v1/notifications/{id}/read",
    tag = "notifications",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 403, description = "Not your notification", body = ErrorResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let notification = owned_notification(&state, &user, parse_uuid(&id)?).await?;
    let updated = state
        .community
        .notifications
        .mark_read(notification.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;
    Ok(ApiResponse::ok(updated))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    tag = "notifications",
    responses(
        (status = 200, description = "All notifications marked read", body = MarkedRead)
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let updated = state
        .community
        .notifications
        .mark_all_read(user.user_id)
        .await?;
    tracing::debug!(user_id = %user.user_id, updated, "Marked notifications read");
    Ok(ApiResponse::ok(MarkedRead { updated }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    tag = "notifications",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 403, description = "Not your notification", body = ErrorResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let notification = owned_notification(&state, &user, parse_uuid(&id)?).await?;
    if !state
        .community
        .notifications
        .delete(notification.id)
        .await?
    {
        return Err(AppError::NotFound("Notification not found".to_string()).into());
    }
    Ok(message(notification.id, "Notification deleted"))
}
