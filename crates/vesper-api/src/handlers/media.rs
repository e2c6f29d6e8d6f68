//! Media metadata records

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use vesper_core::models::{
    AuthUser, CreateMediaRequest, Media, MediaListQuery, ModerationStatus, SortOrder,
    UpdateMediaRequest,
};
use vesper_core::AppError;
use vesper_db::{ColumnValues, Condition, ResourceTable, SqlValue, MEDIA_COLUMNS};

use crate::auth::{CurrentUser, MaybeUser};
use crate::controller::{non_blank, set_if_present, Resource};
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::{message, paginated, ApiResponse};
use crate::state::AppState;

pub struct MediaItems;

impl ResourceTable for MediaItems {
    type Record = Media;

    const TABLE: &'static str = "media";
    const COLUMNS: &'static str = MEDIA_COLUMNS;
    const SEARCHABLE: &'static [&'static str] = &["title", "description"];
    const SORTABLE: &'static [&'static str] =
        &["created_at", "title", "view_count", "like_count", "duration_seconds"];
    const DEFAULT_SORT: &'static str = "created_at";
    const DEFAULT_ORDER: SortOrder = SortOrder::Desc;
    const SOFT_DELETE: bool = true;
    const TRACKS_UPDATES: bool = true;
}

fn status_value(status: ModerationStatus) -> SqlValue {
    SqlValue::enumeration("moderation_status", status.as_str())
}

/// Staff may filter by any moderation status; everyone else only ever sees active media.
fn status_filter(
    requested: Option<ModerationStatus>,
    viewer: Option<&AuthUser>,
) -> Option<Condition> {
    let is_staff = viewer.is_some_and(AuthUser::is_staff);
    match (is_staff, requested) {
        (true, Some(status)) => Some(Condition::eq("moderation_status", status_value(status))),
        (true, None) => None,
        (false, _) => Some(Condition::eq(
            "moderation_status",
            status_value(ModerationStatus::Active),
        )),
    }
}

impl Resource for MediaItems {
    const NAME: &'static str = "Media";

    type Create = CreateMediaRequest;
    type Update = UpdateMediaRequest;
    type Query = MediaListQuery;
    type Output = Media;

    fn filters_from_query(
        query: &MediaListQuery,
        viewer: Option<&AuthUser>,
    ) -> Result<Vec<Condition>, AppError> {
        let mut conditions = Vec::new();
        if let Some(media_type) = query.media_type {
            conditions.push(Condition::eq(
                "media_type",
                SqlValue::enumeration("media_type", media_type.as_str()),
            ));
        }
        if let Some(category) = non_blank(query.category.as_deref()) {
            conditions.push(Condition::eq("category", category));
        }
        conditions.extend(status_filter(query.status, viewer));
        Ok(conditions)
    }

    fn owner_of(record: &Media) -> Option<Uuid> {
        Some(record.uploader_id)
    }

    /// Media under review or removed stays reachable for its uploader and staff.
    fn visible_to(record: &Media, viewer: Option<&AuthUser>) -> bool {
        record.moderation_status == ModerationStatus::Active
            || viewer.is_some_and(|v| v.is_staff() || v.user_id == record.uploader_id)
    }

    fn present(record: Media, _viewer: Option<&AuthUser>) -> Media {
        record
    }

    fn before_save(input: CreateMediaRequest, user: &AuthUser) -> Result<ColumnValues, AppError> {
        Ok(vec![
            ("uploader_id", user.user_id.into()),
            ("title", input.title.trim().into()),
            ("description", input.description.into()),
            (
                "media_type",
                SqlValue::enumeration("media_type", input.media_type.as_str()),
            ),
            ("url", input.url.into()),
            ("duration_seconds", input.duration_seconds.into()),
            ("category", input.category.into()),
        ])
    }

    fn before_update(
        input: UpdateMediaRequest,
        _existing: &Media,
        _user: &AuthUser,
    ) -> Result<ColumnValues, AppError> {
        let mut values = ColumnValues::new();
        set_if_present(&mut values, "title", input.title.map(|t| t.trim().to_string()));
        set_if_present(&mut values, "description", input.description);
        set_if_present(&mut values, "duration_seconds", input.duration_seconds);
        set_if_present(&mut values, "category", input.category);
        Ok(values)
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/media",
    tag = "media",
    params(MediaListQuery),
    responses(
        (status = 200, description = "Paginated media"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<MediaListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state
        .resource::<MediaItems>()
        .get_list(&query, viewer.as_ref())
        .await?;
    Ok(paginated(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media found", body = Media),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let media = state
        .resource::<MediaItems>()
        .get_by_id(&id, viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(media))
}

#[utoipa::path(
    post,
    path = "/api/v1/media",
    tag = "media",
    request_body = CreateMediaRequest,
    responses(
        (status = 201, description = "Media created", body = Media),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_media(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateMediaRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let media = state
        .resource::<MediaItems>()
        .create(&state, input, &user)
        .await?;
    tracing::info!(media_id = %media.id, uploader_id = %user.user_id, "Media created");
    Ok(ApiResponse::created(media).with_message("Media created"))
}

#[utoipa::path(
    put,
    path = "/api/v1/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    request_body = UpdateMediaRequest,
    responses(
        (status = 200, description = "Media updated", body = Media),
        (status = 403, description = "Not the uploader", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_media(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateMediaRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(input) = payload?;
    let media = state
        .resource::<MediaItems>()
        .update(&state, &id, input, &user)
        .await?;
    Ok(ApiResponse::ok(media).with_message("Media updated"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media deleted"),
        (status = 403, description = "Not the uploader", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = state
        .resource::<MediaItems>()
        .delete(&state, &id, &user)
        .await?;
    Ok(message(id, "Media deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vesper_core::models::{MediaType, UserRole};

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    fn media(uploader_id: Uuid, status: ModerationStatus) -> Media {
        Media {
            id: Uuid::new_v4(),
            uploader_id,
            title: "Evening sermon".to_string(),
            description: None,
            media_type: MediaType::Audio,
            url: "https://cdn.example.org/sermon.mp3".to_string(),
            duration_seconds: Some(1800.0),
            category: Some("sermons".to_string()),
            moderation_status: status,
            view_count: 0,
            like_count: 0,
            bookmark_count: 0,
            report_count: 0,
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn regular_users_are_pinned_to_active() {
        let member = user(UserRole::User);
        assert!(status_filter(Some(ModerationStatus::Removed), Some(&member)).is_some());
        assert!(status_filter(None, None).is_some());
    }

    #[test]
    fn staff_see_everything_unless_filtering() {
        let moderator = user(UserRole::Moderator);
        assert!(status_filter(None, Some(&moderator)).is_none());
        assert!(status_filter(Some(ModerationStatus::UnderReview), Some(&moderator)).is_some());
    }

    #[test]
    fn hidden_media_is_visible_to_uploader_and_staff() {
        let uploader = user(UserRole::User);
        let record = media(uploader.user_id, ModerationStatus::UnderReview);
        assert!(MediaItems::visible_to(&record, Some(&uploader)));
        assert!(MediaItems::visible_to(&record, Some(&user(UserRole::Admin))));
        assert!(!MediaItems::visible_to(&record, Some(&user(UserRole::User))));
        assert!(!MediaItems::visible_to(&record, None));
    }
}
