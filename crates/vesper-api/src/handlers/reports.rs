//! Media reports and the staff review queue

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use vesper_core::models::{
    CreateReportRequest, MediaReport, PageRequest, ReportListQuery, ReviewReportRequest,
};

use crate::auth::CurrentUser;
use crate::controller::parse_uuid;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::{paginated, ApiResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/media/{id}/report",
    tag = "reports",
    params(("id" = Uuid, Path, description = "Media ID")),
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report filed", body = MediaReport),
        (status = 400, description = "Invalid reason, own media or duplicate report", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn report_media(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<CreateReportRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let media_id = parse_uuid(&id)?;
    let report = state
        .media
        .moderation
        .report_media(&user, media_id, input)
        .await?;
    Ok(ApiResponse::created(report).with_message("Report submitted"))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Paginated reports"),
        (status = 403, description = "Staff only", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = PageRequest::from_query(query.page, query.limit);
    let reports = state
        .media
        .moderation
        .list_reports(&user, query.status, page)
        .await?;
    Ok(paginated(reports))
}

#[utoipa::path(
    patch,
    path = "/api/v1/reports/{id}",
    tag = "reports",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = ReviewReportRequest,
    responses(
        (status = 200, description = "Report reviewed", body = MediaReport),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn review_report(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<ReviewReportRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let report_id = parse_uuid(&id)?;
    let report = state
        .media
        .moderation
        .review_report(&user, report_id, input.status)
        .await?;
    Ok(ApiResponse::ok(report).with_message("Report reviewed"))
}
