use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "report_reason", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportReason {
    Spam,
    Inappropriate,
    Copyright,
    Misleading,
    Other,
}

impl std::str::FromStr for ReportReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spam" => Ok(ReportReason::Spam),
            "inappropriate" => Ok(ReportReason::Inappropriate),
            "copyright" => Ok(ReportReason::Copyright),
            "misleading" => Ok(ReportReason::Misleading),
            "other" => Ok(ReportReason::Other),
            other => Err(format!(
                "Invalid reason '{}'. Must be one of: spam, inappropriate, copyright, misleading, other",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Reviewed,
    Dismissed,
    ActionTaken,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Reviewed => "reviewed",
            ReportStatus::Dismissed => "dismissed",
            ReportStatus::ActionTaken => "action_taken",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MediaReport {
    pub id: Uuid,
    pub media_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: ReportReason,
    pub details: Option<String>,
    pub status: ReportStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// `reason` is kept as a string so that an unknown value produces a descriptive 400
/// instead of a JSON rejection.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateReportRequest {
    #[validate(length(min = 1, message = "reason is required"))]
    pub reason: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "details must be at most 2000 characters"))]
    pub details: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReviewReportRequest {
    pub status: ReportStatus,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct ReportListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<ReportStatus>,
}

/// Outcome of filing a report: the new row plus the media's report counter after the increment.
#[derive(Debug, Clone)]
pub struct FiledReport {
    pub report: MediaReport,
    pub report_count: i32,
}
