//! Platform and per-media analytics

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use vesper_core::models::{DashboardQuery, DashboardStats, MediaAnalytics};
use vesper_core::AppError;
use vesper_db::PgResourceStore;
use vesper_services::{get_or_set, CacheClass, CacheKey};

use super::media::MediaItems;
use crate::auth::CurrentUser;
use crate::controller::{parse_uuid, Access};
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::ApiResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/analytics/dashboard",
    tag = "analytics",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Platform dashboard", body = DashboardStats),
        (status = 403, description = "Staff only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    Access::Staff.authorize(&user, None)?;
    let days = query.days();
    let key = CacheKey::new(CacheClass::AnalyticsDashboard, [days.to_string()]);

    let analytics = &state.media.analytics;
    let stats = get_or_set(state.cache.as_ref(), &key, || analytics.dashboard(days)).await?;
    Ok(ApiResponse::ok(stats))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/media/{id}",
    tag = "analytics",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media analytics", body = MediaAnalytics),
        (status = 403, description = "Not the uploader", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn media_analytics(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let media_id = parse_uuid(&id)?;
    let media = PgResourceStore::<MediaItems>::new(state.pool.clone())
        .find_by_id(media_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;
    Access::OwnerOrStaff.authorize(&user, Some(media.uploader_id))?;

    let analytics = state.media.analytics.media_analytics(media.id).await?;
    Ok(ApiResponse::ok(analytics))
}
